//! Input checks applied before anything is written to the database.

use crate::error::{ClubError, Result};
use chrono::{Datelike, NaiveDate};
use std::path::Path;

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Largest accepted photo upload (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// File extensions accepted for player photos.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

const EARLIEST_BIRTH_YEAR: i32 = 1900;

/// Validate a required name field and return it trimmed.
pub fn validate_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClubError::validation(field, "must not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ClubError::validation(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Turn blank optional input into `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_email(value: &str) -> Result<String> {
    let email = value.trim();
    let invalid = || ClubError::validation("email", format!("'{}' is not an email address", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let valid_domain = domain
        .split_once('.')
        .map(|(host, rest)| !host.is_empty() && !rest.is_empty() && !rest.ends_with('.'))
        .unwrap_or(false);
    if !valid_domain {
        return Err(invalid());
    }
    Ok(email.to_string())
}

/// Accept digits with the usual separators; between 6 and 20 digits.
pub fn validate_phone(value: &str) -> Result<String> {
    let phone = value.trim();
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ');
    let digit_count = phone.chars().filter(char::is_ascii_digit).count();

    if !phone.chars().all(allowed) || !(6..=20).contains(&digit_count) {
        return Err(ClubError::validation(
            "phone",
            format!("'{}' is not a phone number", phone),
        ));
    }
    Ok(phone.to_string())
}

pub fn validate_date_of_birth(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate> {
    if date > today {
        return Err(ClubError::validation(
            "date of birth",
            "must not be in the future",
        ));
    }
    if date.year() < EARLIEST_BIRTH_YEAR {
        return Err(ClubError::validation(
            "date of birth",
            format!("must not be before {}", EARLIEST_BIRTH_YEAR),
        ));
    }
    Ok(date)
}

/// Check a photo before it is attached to a player.
///
/// The file must exist, be non-empty, no larger than [`MAX_UPLOAD_BYTES`]
/// and carry one of [`ALLOWED_UPLOAD_EXTENSIONS`].
pub fn check_upload(path: &Path) -> Result<u64> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ClubError::validation(
            "photo",
            format!(
                "unsupported file type '{}' (expected one of: {})",
                extension,
                ALLOWED_UPLOAD_EXTENSIONS.join(", ")
            ),
        ));
    }

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(ClubError::validation("photo", "not a regular file"));
    }
    let size = metadata.len();
    if size == 0 {
        return Err(ClubError::validation("photo", "file is empty"));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ClubError::validation(
            "photo",
            format!(
                "file is {} bytes; the limit is {} bytes",
                size, MAX_UPLOAD_BYTES
            ),
        ));
    }
    Ok(size)
}
