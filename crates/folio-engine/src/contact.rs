//! Contact form validation
//!
//! Two passes, mirroring how the form behaves while typing and on submit:
//! `check_field` validates a single field as it changes (an empty email is
//! not flagged yet), `validate` checks the whole form before sending.

use folio_core::config::ContactConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("name must be at least {min} characters")]
    NameTooShort { min: usize },

    #[error("name is required")]
    NameRequired,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("message must be at least {min} characters")]
    MessageTooShort { min: usize },

    #[error("message is too short")]
    MessageRequired,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::NameTooShort { .. } | FieldError::NameRequired => Field::Name,
            FieldError::InvalidEmail => Field::Email,
            FieldError::MessageTooShort { .. } | FieldError::MessageRequired => Field::Message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Validate one field as the user types.
pub fn check_field(field: Field, value: &str, rules: &ContactConfig) -> Option<FieldError> {
    let chars = value.chars().count();
    match field {
        Field::Name if chars < rules.min_name_chars => Some(FieldError::NameTooShort {
            min: rules.min_name_chars,
        }),
        Field::Email if !value.is_empty() && !is_valid_email(value) => Some(FieldError::InvalidEmail),
        Field::Message if chars < rules.min_message_chars => Some(FieldError::MessageTooShort {
            min: rules.min_message_chars,
        }),
        _ => None,
    }
}

impl ContactForm {
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    /// Final validation before sending. Returns every failing field.
    pub fn validate(&self, rules: &ContactConfig) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.chars().count() < rules.min_name_chars {
            errors.push(FieldError::NameRequired);
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::InvalidEmail);
        }
        if self.message.chars().count() < rules.min_message_chars {
            errors.push(FieldError::MessageRequired);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ContactConfig {
        ContactConfig::default()
    }

    #[test]
    fn email_pattern_is_built_once() {
        assert!(std::ptr::eq(email_pattern(), email_pattern()));
        assert!(email_pattern().is_match("x@y.z"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("me@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.io"));
        assert!(!is_valid_email("me@example"));
        assert!(!is_valid_email("me example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn live_check_name() {
        assert_eq!(
            check_field(Field::Name, "A", &rules()),
            Some(FieldError::NameTooShort { min: 2 })
        );
        assert_eq!(check_field(Field::Name, "Al", &rules()), None);
    }

    #[test]
    fn live_check_counts_chars_not_bytes() {
        assert_eq!(check_field(Field::Name, "Ян", &rules()), None);
        assert!(check_field(Field::Name, "Я", &rules()).is_some());
    }

    #[test]
    fn live_check_empty_email_is_not_flagged() {
        assert_eq!(check_field(Field::Email, "", &rules()), None);
        assert_eq!(check_field(Field::Email, "nope", &rules()), Some(FieldError::InvalidEmail));
    }

    #[test]
    fn live_check_message() {
        let err = check_field(Field::Message, "short", &rules()).unwrap();
        assert_eq!(err.to_string(), "message must be at least 10 characters");
        assert_eq!(check_field(Field::Message, "long enough text", &rules()), None);
    }

    #[test]
    fn submit_reports_every_failure() {
        let form = ContactForm::default();
        let errors = form.validate(&rules()).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(FieldError::field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Message]);
    }

    #[test]
    fn submit_accepts_complete_form() {
        let mut form = ContactForm::default();
        form.set(Field::Name, "Ada");
        form.set(Field::Email, "ada@example.com");
        form.set(Field::Message, "Let's build something.");
        assert_eq!(form.validate(&rules()), Ok(()));
    }

    #[test]
    fn submit_rejects_empty_email() {
        let form = ContactForm {
            name: "Ada".into(),
            email: String::new(),
            message: "Let's build something.".into(),
        };
        assert_eq!(form.validate(&rules()), Err(vec![FieldError::InvalidEmail]));
    }
}
