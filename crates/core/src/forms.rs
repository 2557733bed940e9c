//! Login and registration form validation.
//!
//! Validation runs before any request is made. The first failing rule wins
//! and its message is what the user sees.

use serde::Serialize;
use thiserror::Error;

use crate::types::Email;

/// Minimum length of a display name on registration.
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum length of a password on registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form field failed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Name should be at least 3 characters")]
    NameTooShort,

    #[error("Please provide a valid email")]
    InvalidEmail,

    #[error("Password required and should contain at least 6 characters")]
    PasswordTooShort,

    #[error("Confirm Password do not match with Password")]
    PasswordMismatch,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails, email before password.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if self.password.trim().is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(())
    }
}

/// Registration form as the user fills it in.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /auth/register`, produced by [`RegisterForm::validate`].
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: Email,
    pub password: &'a str,
}

impl RegisterForm {
    /// Check name, email, password and confirmation, in that order.
    ///
    /// The request body leaves out the confirmation field.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails.
    pub fn validate(&self) -> Result<RegisterRequest<'_>, ValidationError> {
        if self.name.trim().chars().count() < MIN_NAME_LENGTH {
            return Err(ValidationError::NameTooShort);
        }
        let email = Email::parse(&self.email).map_err(|_| ValidationError::InvalidEmail)?;
        if self.password.trim().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.confirm_password != self.password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(RegisterRequest {
            name: &self.name,
            email,
            password: &self.password,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            name: "crio.do".to_string(),
            email: "crio@example.com".to_string(),
            password: "learnbydoing".to_string(),
            confirm_password: "learnbydoing".to_string(),
        }
    }

    #[test]
    fn test_login_requires_email() {
        let form = LoginForm::new("   ", "secret");
        assert_eq!(form.validate(), Err(ValidationError::EmailRequired));
    }

    #[test]
    fn test_login_requires_password() {
        let form = LoginForm::new("user@example.com", "  ");
        assert_eq!(form.validate(), Err(ValidationError::PasswordRequired));
    }

    #[test]
    fn test_login_valid() {
        assert!(LoginForm::new("user@example.com", "x").validate().is_ok());
    }

    #[test]
    fn test_register_valid() {
        let form = valid_registration();
        let request = form.validate().unwrap();
        assert_eq!(request.email.as_str(), "crio@example.com");
        assert_eq!(request.name, "crio.do");
    }

    #[test]
    fn test_register_accepts_long_email() {
        let form = RegisterForm {
            email: format!("{}@example.com", "c".repeat(260)),
            ..valid_registration()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_register_short_name() {
        let form = RegisterForm {
            name: " ab ".to_string(),
            ..valid_registration()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::NameTooShort);
    }

    #[test]
    fn test_register_bad_email() {
        let form = RegisterForm {
            email: "crio@localhost".to_string(),
            ..valid_registration()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::InvalidEmail);
    }

    #[test]
    fn test_register_short_password() {
        let form = RegisterForm {
            password: "12345 ".to_string(),
            confirm_password: "12345 ".to_string(),
            ..valid_registration()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordTooShort);
    }

    #[test]
    fn test_register_mismatch() {
        let form = RegisterForm {
            confirm_password: "learnbydoin".to_string(),
            ..valid_registration()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn test_register_rules_checked_in_order() {
        let form = RegisterForm {
            name: "a".to_string(),
            email: "bad".to_string(),
            ..RegisterForm::default()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::NameTooShort);
    }

    #[test]
    fn test_register_request_omits_confirmation() {
        let form = valid_registration();
        let json = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(json["name"], "crio.do");
        assert!(json.get("confirm_password").is_none());
    }
}
