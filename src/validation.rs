//! Input checks shared by the auth routes.

const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 256;

/// 8 to 256 bytes with at least one upper-case letter, one lower-case letter
/// and one digit.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err("Password must be at most 256 characters");
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_upper || !has_lower || !has_digit {
        return Err("Password needs an upper-case letter, a lower-case letter and a digit");
    }
    Ok(())
}

/// `local@domain.tld` with a conservative character set.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if !local
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'+' | b'-'))
    {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    {
        return false;
    }
    domain
        .split('.')
        .all(|part| !part.is_empty() && !part.starts_with('-') && !part.ends_with('-'))
}

/// 2 to 32 characters: letters, digits, `_` and `-`.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let char_count = username.chars().count();
    if !(2..=32).contains(&char_count) {
        return Err("Username must be between 2 and 32 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, digits, '_' and '-'");
    }
    Ok(())
}
