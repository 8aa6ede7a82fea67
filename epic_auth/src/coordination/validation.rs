//! Form field rules shared by signup and profile editing

use super::errors::FieldError;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const NAME_MIN: usize = 1;
const NAME_MAX: usize = 40;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 100;
const EMAIL_MAX: usize = 100;

pub(super) fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    let valid = email.len() <= EMAIL_MAX
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !valid {
        errors.push(FieldError {
            field: "email",
            message: "Email is invalid".to_string(),
        });
    }
}

pub(super) fn check_username(username: &str, errors: &mut Vec<FieldError>) {
    let username = username.trim();
    let len = username.chars().count();
    let message = if len < USERNAME_MIN {
        Some("Username is too short")
    } else if len > USERNAME_MAX {
        Some("Username is too long")
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Some("Username can only include letters, numbers, and underscores")
    } else {
        None
    };
    if let Some(message) = message {
        errors.push(FieldError {
            field: "username",
            message: message.to_string(),
        });
    }
}

pub(super) fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    let len = name.trim().chars().count();
    if len < NAME_MIN {
        errors.push(FieldError {
            field: "name",
            message: "Name is required".to_string(),
        });
    } else if len > NAME_MAX {
        errors.push(FieldError {
            field: "name",
            message: "Name is too long".to_string(),
        });
    }
}

pub(super) fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        errors.push(FieldError {
            field: "password",
            message: "Password is too short".to_string(),
        });
    } else if len > PASSWORD_MAX {
        errors.push(FieldError {
            field: "password",
            message: "Password is too long".to_string(),
        });
    }
}
