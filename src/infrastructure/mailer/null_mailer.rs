//! No-op mailer for development or disabled email.

use super::service::{MailResult, MailTemplate, Mailer};
use async_trait::async_trait;
use tracing::{debug, info};

/// A mailer that drops every message.
///
/// Used when no SMTP host is configured. The rendered template is still
/// logged at debug level so activation tokens can be picked up locally.
pub struct NullMailer;

impl NullMailer {
    pub fn new() -> Self {
        info!("Using NullMailer (email delivery disabled)");
        Self
    }
}

impl Default for NullMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, recipient: &str, template: MailTemplate) -> MailResult<()> {
        let mail = template.render()?;
        debug!(
            recipient,
            template = template.name(),
            body = %mail.plain_body,
            "email not sent, mailer disabled"
        );
        Ok(())
    }
}
