// dbbackup/src/backup/notify.rs
use anyhow::Result;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;

/// Capability that alerts operators about a failed run.
///
/// Best effort: implementations never return an error to the caller. A
/// notification that cannot be sent must not change the run's reported status.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, subject: &str, body: &str);
}

/// Sends failure notifications by email over SMTP.
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn send(&self, subject: &str, body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.config.from.parse::<Mailbox>()?)
            .subject(subject);
        for recipient in &self.config.to {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        let message = builder.body(body.to_string())?;

        let mailer = SmtpTransport::builder_dangerous(&self.config.smtp_host)
            .port(self.config.smtp_port)
            .build();
        mailer.send(&message)?;
        Ok(())
    }
}

impl NotificationSink for SmtpNotifier {
    fn notify(&self, subject: &str, body: &str) {
        match self.send(subject, body) {
            Ok(()) => println!("📧 Failure notification sent to {:?}", self.config.to),
            Err(e) => eprintln!("⚠️ Failed to send failure notification: {:#}", e),
        }
    }
}
