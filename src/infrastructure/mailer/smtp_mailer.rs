//! SMTP mailer backed by `lettre`.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

use super::service::{MailError, MailResult, MailTemplate, Mailer};

/// Delivery attempts per message, including the first one.
const SEND_ATTEMPTS: usize = 3;
const RETRY_INTERVAL_MS: u64 = 1000;
const SMTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`SmtpMailer`].
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

/// Mailer that delivers over SMTP with STARTTLS.
///
/// Each message is attempted up to three times, one second apart.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Address`] if the sender is not a valid mailbox and
    /// [`MailError::Transport`] if the relay cannot be configured.
    pub fn new(settings: &SmtpSettings) -> MailResult<Self> {
        let sender: Mailbox = settings
            .sender
            .parse()
            .map_err(|_| MailError::Address(settings.sender.clone()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        info!(
            "SMTP mailer configured for {}:{}",
            settings.host, settings.port
        );

        Ok(Self { transport, sender })
    }

    fn build_message(&self, recipient: &str, template: &MailTemplate) -> MailResult<Message> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| MailError::Address(recipient.to_string()))?;
        let mail = template.render()?;

        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(mail.subject)
            .multipart(MultiPart::alternative_plain_html(
                mail.plain_body,
                mail.html_body,
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, recipient: &str, template: MailTemplate) -> MailResult<()> {
        let message = self.build_message(recipient, &template)?;
        let strategy = FixedInterval::from_millis(RETRY_INTERVAL_MS).take(SEND_ATTEMPTS - 1);
        let (message, template) = (&message, &template);

        Retry::spawn(strategy, || async move {
            self.transport
                .send(message.clone())
                .await
                .map(|_| ())
                .map_err(|e| {
                    warn!(template = template.name(), error = %e, "SMTP send attempt failed");
                    MailError::Transport(e.to_string())
                })
        })
        .await?;

        debug!(template = template.name(), "email sent");
        Ok(())
    }
}
