//! Mailer trait and the catalogue of outgoing messages.

use askama::Template;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while rendering or delivering a message.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to render template '{template}': {source}")]
    Render {
        template: &'static str,
        #[source]
        source: askama::Error,
    },

    #[error("invalid address '{0}'")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp delivery failed: {0}")]
    Transport(String),
}

pub type MailResult<T> = Result<T, MailError>;

/// An outgoing message together with the data it is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTemplate {
    /// Sent after registration with the activation token.
    UserWelcome { activation_token: String, user_id: i64 },
}

/// A message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
}

#[derive(Template)]
#[template(path = "email/user_welcome.txt")]
struct UserWelcomeText<'a> {
    activation_token: &'a str,
    user_id: i64,
}

#[derive(Template)]
#[template(path = "email/user_welcome.html")]
struct UserWelcomeHtml<'a> {
    activation_token: &'a str,
    user_id: i64,
}

impl MailTemplate {
    /// Template name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            MailTemplate::UserWelcome { .. } => "user_welcome",
        }
    }

    /// Renders subject, plain-text and HTML bodies.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Render`] if a template fails to render.
    pub fn render(&self) -> MailResult<RenderedMail> {
        let name = self.name();
        let render_err = |source| MailError::Render {
            template: name,
            source,
        };

        match self {
            MailTemplate::UserWelcome {
                activation_token,
                user_id,
            } => Ok(RenderedMail {
                subject: "Welcome to the Book Club!".to_string(),
                plain_body: UserWelcomeText {
                    activation_token,
                    user_id: *user_id,
                }
                .render()
                .map_err(render_err)?,
                html_body: UserWelcomeHtml {
                    activation_token,
                    user_id: *user_id,
                }
                .render()
                .map_err(render_err)?,
            }),
        }
    }
}

/// Trait for delivering templated email.
///
/// # Implementations
///
/// - [`crate::infrastructure::mailer::SmtpMailer`] - SMTP delivery via `lettre`
/// - [`crate::infrastructure::mailer::NullMailer`] - No-op used when SMTP is not configured
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Renders `template` and delivers it to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a [`MailError`] if rendering fails or delivery fails after all
    /// retries.
    async fn send(&self, recipient: &str, template: MailTemplate) -> MailResult<()>;
}
