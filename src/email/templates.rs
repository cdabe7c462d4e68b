//! Email template system
//!
//! Variables are specified using {{variable_name}} syntax.

use std::collections::HashMap;

/// Available email templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Six-digit email verification code
    Verification,
    /// Greeting sent once the address is verified
    Welcome,
}

impl EmailTemplate {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Verification => "Verify Your Email",
            Self::Welcome => "Welcome to {{church_name}}",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::Verification => VERIFICATION_TEMPLATE,
            Self::Welcome => WELCOME_TEMPLATE,
        }
    }
}

#[derive(Debug, Default)]
pub struct TemplateEngine {
    variables: HashMap<String, String>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Replace every {{variable}} with its value. Unknown placeholders stay as-is.
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();

        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{}}}}}", key);
            result = result.replace(&placeholder, value);
        }

        result
    }

    pub fn render_template(&self, template: EmailTemplate) -> RenderedEmail {
        RenderedEmail {
            subject: self.render(template.subject()),
            body: self.render(template.body()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

const VERIFICATION_TEMPLATE: &str = r#"Email Verification

Your verification code is: {{code}}

This code will expire in 15 minutes."#;

const WELCOME_TEMPLATE: &str = r#"Welcome {{name}}!

Thank you for joining {{church_name}}. We're excited to have you in our community."#;
