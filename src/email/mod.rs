//! Outbound email
//!
//! Delivery is an external collaborator. The service layer only sees
//! [`EmailSender`]; the default implementation writes the message to the log.

pub mod templates;

pub use templates::{EmailTemplate, RenderedEmail, TemplateEngine};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email sender not configured")]
    NotConfigured,

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Narrow interface for sending a single message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Logs messages instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(to = %to, subject = %subject, "Sending email");
        tracing::debug!(body = %body, "Email content");
        Ok(())
    }
}

/// Render and send the verification code email
pub async fn send_verification_email(
    sender: &dyn EmailSender,
    to: &str,
    code: &str,
) -> Result<(), EmailError> {
    let mut engine = TemplateEngine::new();
    engine.set("code", code);
    let email = engine.render_template(EmailTemplate::Verification);
    sender.send(to, &email.subject, &email.body).await
}

/// Render and send the greeting for a newly verified member
pub async fn send_welcome_email(
    sender: &dyn EmailSender,
    to: &str,
    name: &str,
    church_name: &str,
) -> Result<(), EmailError> {
    let mut engine = TemplateEngine::new();
    engine.set("name", name).set("church_name", church_name);
    let email = engine.render_template(EmailTemplate::Welcome);
    sender.send(to, &email.subject, &email.body).await
}
