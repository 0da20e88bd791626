use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Sign-in/sign-up problems; the first failing rule is reported
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFormError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Name is required")]
    MissingName,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthFormError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthFormError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), AuthFormError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthFormError::MissingCredentials);
        }
        if self.name.trim().is_empty() {
            return Err(AuthFormError::MissingName);
        }
        if self.password != self.confirm_password {
            return Err(AuthFormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthFormError::PasswordTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_requires_both_fields() {
        assert!(SignInForm::new("ana@example.com", "secret").validate().is_ok());
        assert_eq!(
            SignInForm::new("ana@example.com", "").validate(),
            Err(AuthFormError::MissingCredentials)
        );
        assert_eq!(
            SignInForm::new("  ", "secret").validate(),
            Err(AuthFormError::MissingCredentials)
        );
    }

    #[test]
    fn test_sign_up_rules_in_order() {
        let mut form = SignUpForm {
            name: String::new(),
            email: "ana@example.com".to_string(),
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
        };
        assert_eq!(form.validate(), Err(AuthFormError::MissingName));

        form.name = "Ana".to_string();
        assert_eq!(form.validate(), Err(AuthFormError::PasswordMismatch));

        form.confirm_password = "abc".to_string();
        assert_eq!(form.validate(), Err(AuthFormError::PasswordTooShort));

        form.password = "abcdef".to_string();
        form.confirm_password = "abcdef".to_string();
        assert!(form.validate().is_ok());
        assert_eq!(
            AuthFormError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters"
        );
    }
}
