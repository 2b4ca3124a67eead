//! Email thread model and the built-in demo thread.
//!
//! The ingestion service is written against [`MailSource`] so the fixture
//! content is interchangeable; [`AdvisorGrantThread`] is the fixed
//! two-message thread about an advisor equity grant used by the
//! `ingest-mail` command.

/// One message of a thread, with the headers the pipeline indexes.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub body: String,
}

impl EmailMessage {
    /// Render the message as the header-plus-body block that gets chunked:
    /// `Subject/From/To/Date` lines, a blank line, then the body.
    pub fn render(&self) -> String {
        format!(
            "Subject: {}\nFrom: {}\nTo: {}\nDate: {}\n\n{}",
            self.subject, self.from, self.to, self.date, self.body
        )
    }
}

/// Provider of messages for mailbox ingestion.
pub trait MailSource: Send + Sync {
    fn messages(&self) -> Vec<EmailMessage>;
}

/// The fixed two-message advisor equity grant thread.
pub struct AdvisorGrantThread;

impl MailSource for AdvisorGrantThread {
    fn messages(&self) -> Vec<EmailMessage> {
        vec![
            EmailMessage {
                from: "alex@founderco.com".to_string(),
                to: "legal@lexsy.com".to_string(),
                subject: "Advisor Equity Grant for Lexsy, Inc.".to_string(),
                date: "July 22, 2025".to_string(),
                body: "Hi Kristina,\n\n\
                    We'd like to bring on a new advisor for Lexsy, Inc.\n\n\
                    * Name: John Smith\n\
                    * Role: Strategic Advisor for AI/VC introductions\n\
                    * Proposed grant: 15,000 RSAs (restricted stock)\n\
                    * Vesting: 2-year vest, monthly, no cliff\n\n\
                    Could you confirm if we have enough shares available under our \
                    Equity Incentive Plan (EIP) and prepare the necessary paperwork?\n\n\
                    Thanks, Alex"
                    .to_string(),
            },
            EmailMessage {
                from: "legal@lexsy.com".to_string(),
                to: "alex@founderco.com".to_string(),
                subject: "Re: Advisor Equity Grant for Lexsy, Inc.".to_string(),
                date: "July 22, 2025".to_string(),
                body: "Hi Alex,\n\n\
                    Thanks for the details!\n\n\
                    We can handle this.\n\n\
                    We will:\n\
                    1. Check EIP availability to confirm 15,000 shares are free to grant.\n\
                    2. Draft:\n\
                    \x20  * Advisor Agreement\n\
                    \x20  * Board Consent authorizing the grant\n\
                    \x20  * Stock Purchase Agreement (if RSAs)\n\n\
                    Please confirm:\n\
                    * Vesting starts at the effective date of the agreement, meaning \
                    whenever we prepare it, or should it start earlier?\n\n\
                    Best, Kristina"
                    .to_string(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_has_two_messages() {
        let messages = AdvisorGrantThread.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].subject.starts_with("Re:"));
    }

    #[test]
    fn render_puts_headers_before_body() {
        let msg = EmailMessage {
            from: "a@example.com".to_string(),
            to: "b@example.com".to_string(),
            subject: "Hello".to_string(),
            date: "July 22, 2025".to_string(),
            body: "Body text.".to_string(),
        };
        let rendered = msg.render();
        assert!(rendered.starts_with("Subject: Hello\nFrom: a@example.com\n"));
        assert!(rendered.ends_with("\n\nBody text."));
        assert!(rendered.contains("Date: July 22, 2025"));
    }
}
