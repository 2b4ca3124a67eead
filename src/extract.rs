//! Text normalization for uploaded documents (PDF, DOCX, TXT).
//!
//! Callers supply raw bytes plus a [`SourceFormat`]; this module returns
//! plain UTF-8 text. Extraction never hard-fails on malformed binary input:
//! an unreadable document degrades to empty text, which the ingestion layer
//! rejects as an empty extraction. Only an unrecognized format is an error.

use std::io::Read;

use crate::error::{DocketError, Result};

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Supported upload formats, declared by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Txt,
}

impl SourceFormat {
    /// Resolve the format from a filename, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(SourceFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(SourceFormat::Docx)
        } else if lower.ends_with(".txt") {
            Ok(SourceFormat::Txt)
        } else {
            Err(DocketError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// Extract plain text from raw bytes according to the declared format.
///
/// Returns an empty string when the bytes cannot be parsed; emptiness is
/// the ingestion layer's rejection signal, not this module's.
pub fn extract_text(bytes: &[u8], format: SourceFormat) -> String {
    match format {
        SourceFormat::Pdf => extract_pdf(bytes),
        SourceFormat::Docx => extract_docx(bytes),
        SourceFormat::Txt => extract_txt(bytes),
    }
}

/// Page texts concatenated in order, newline-separated. A page that yields
/// no text contributes an empty string rather than aborting the document.
fn extract_pdf(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(pages) => pages.join("\n"),
        Err(_) => String::new(),
    }
}

/// Every paragraph of `word/document.xml`, one per line, in document order.
fn extract_docx(bytes: &[u8]) -> String {
    let Ok(mut archive) = zip::ZipArchive::new(std::io::Cursor::new(bytes)) else {
        return String::new();
    };
    let Ok(entry) = archive.by_name("word/document.xml") else {
        return String::new();
    };
    let mut xml = Vec::new();
    if entry.take(MAX_XML_ENTRY_BYTES).read_to_end(&mut xml).is_err() {
        return String::new();
    }
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return String::new();
    }
    paragraphs_from_xml(&xml).unwrap_or_default()
}

fn paragraphs_from_xml(xml: &[u8]) -> std::result::Result<String, quick_xml::Error> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    // Text is only collected inside w:t runs, so markup whitespace never
    // leaks and run-internal spacing survives.
    let mut buf = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_t = true;
                }
            }
            quick_xml::events::Event::Text(te) if in_t => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            quick_xml::events::Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    // One line per paragraph, no trailing separator.
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// UTF-8, falling back to a Latin-1 decode; never fails on byte content.
fn extract_txt(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn format_from_filename_is_case_insensitive() {
        assert_eq!(
            SourceFormat::from_filename("Brief.PDF").unwrap(),
            SourceFormat::Pdf
        );
        assert_eq!(
            SourceFormat::from_filename("notes.txt").unwrap(),
            SourceFormat::Txt
        );
        assert_eq!(
            SourceFormat::from_filename("contract.docx").unwrap(),
            SourceFormat::Docx
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = SourceFormat::from_filename("slides.pptx").unwrap_err();
        assert!(matches!(err, DocketError::UnsupportedFormat(_)));
    }

    #[test]
    fn txt_decodes_utf8() {
        let text = extract_text("Héllo wörld".as_bytes(), SourceFormat::Txt);
        assert_eq!(text, "Héllo wörld");
    }

    #[test]
    fn txt_falls_back_to_latin1() {
        // 0xE9 is 'é' in Latin-1 but invalid standalone UTF-8.
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        let text = extract_text(&bytes, SourceFormat::Txt);
        assert_eq!(text, "café");
    }

    #[test]
    fn invalid_pdf_yields_empty_text() {
        let text = extract_text(b"not a pdf", SourceFormat::Pdf);
        assert!(text.is_empty());
    }

    #[test]
    fn invalid_docx_yields_empty_text() {
        let text = extract_text(b"not a zip", SourceFormat::Docx);
        assert!(text.is_empty());
    }

    #[test]
    fn docx_paragraphs_one_per_line() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = extract_text(&docx_bytes(xml), SourceFormat::Docx);
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn docx_without_document_xml_yields_empty_text() {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("other.xml", options).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        let text = extract_text(&cursor.into_inner(), SourceFormat::Docx);
        assert!(text.is_empty());
    }
}
