use crate::error::{PortalError, Result};

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MAX_USERNAME_CHARS: usize = 50;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Per-rule result of the registration password checks, shown as four bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordStrength {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
}

impl PasswordStrength {
    pub fn of(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_CHARS,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.length && self.uppercase && self.lowercase && self.digit
    }

    /// Messages for every rule the password fails.
    pub fn failures(&self) -> Vec<String> {
        [
            (self.length, "Password must be at least 8 characters long"),
            (self.uppercase, "Password must contain at least one uppercase letter"),
            (self.lowercase, "Password must contain at least one lowercase letter"),
            (self.digit, "Password must contain at least one digit"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, message)| message.to_string())
        .collect()
    }
}

/// Fields of the registration form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Client-side checks run before a login request is sent.
pub fn validate_login(username: &str, password: &str) -> Result<()> {
    if username.chars().count() < MIN_USERNAME_CHARS {
        return Err(PortalError::Validation(vec![
            "Username must be at least 3 characters long".to_string(),
        ]));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PortalError::Validation(vec![
            "Password must be at least 8 characters long".to_string(),
        ]));
    }
    Ok(())
}

/// Client-side checks run before a registration request is sent.
///
/// Stops at the first failing field, except for the password whose failed
/// rules are all reported together.
pub fn validate_registration(form: &RegistrationForm) -> Result<()> {
    if form.password != form.password_confirm {
        return Err(PortalError::Validation(vec![
            "Passwords do not match".to_string(),
        ]));
    }

    let username_chars = form.username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&username_chars) {
        return Err(PortalError::Validation(vec![
            "Username must be between 3 and 50 characters long".to_string(),
        ]));
    }

    let strength = PasswordStrength::of(&form.password);
    if !strength.is_valid() {
        return Err(PortalError::Validation(strength.failures()));
    }
    Ok(())
}
