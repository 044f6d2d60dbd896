//! Outgoing email.
//!
//! Provides a [`Mailer`] trait with two implementations:
//! - [`SmtpMailer`] - SMTP delivery with retries
//! - [`NullMailer`] - No-op implementation when SMTP is not configured
//!
//! Message bodies are `askama` templates under `templates/email/`.

mod null_mailer;
mod service;
mod smtp_mailer;

pub use null_mailer::NullMailer;
pub use service::{MailError, MailResult, MailTemplate, Mailer, RenderedMail};
pub use smtp_mailer::{SmtpMailer, SmtpSettings};

#[cfg(test)]
pub use service::MockMailer;
