use serde::Deserialize;

use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{Email, MaxLength, MinLength, Required};

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Form for RegisterInput {
    type Cleaned = Self;

    fn clean(self) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new();
        let name = fields.text("name", &self.name, &[&Required::new("Name"), &MaxLength::new("Name", 100)]);
        let email = fields
            .text("email", &self.email, &[&Required::new("Email"), &Email])
            .to_lowercase();
        fields.verbatim(
            "password",
            &self.password,
            &[&MinLength::new("Password", MIN_PASSWORD_LENGTH)],
        );
        fields.finish(Self {
            name,
            email,
            password: self.password,
        })
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl Form for LoginInput {
    type Cleaned = Self;

    fn clean(self) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new();
        let email = fields
            .text("email", &self.email, &[&Required::new("Email")])
            .to_lowercase();
        fields.verbatim("password", &self.password, &[&Required::new("Password")]);
        fields.finish(Self {
            email,
            password: self.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_normalizes_email() {
        let input = RegisterInput {
            name: " Ada ".to_string(),
            email: "Ada@Example.COM".to_string(),
            password: "correct horse".to_string(),
        };
        let cleaned = input.clean().unwrap();
        assert_eq!(cleaned.name, "Ada");
        assert_eq!(cleaned.email, "ada@example.com");
    }

    #[test]
    fn test_register_rejects_short_password() {
        let input = RegisterInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        };
        let errors = input.clean().unwrap_err();
        assert_eq!(errors.message(), "Password must be at least 8 characters.");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let input = LoginInput {
            email: String::new(),
            password: String::new(),
        };
        assert_eq!(input.clean().unwrap_err().len(), 2);
    }
}
