//! Per-field validators.
//!
//! Each validator takes raw user text and returns the normalized value or a
//! [`ValidationError`] whose `reason` is shown to the user verbatim.

use std::sync::LazyLock;

use regex::Regex;

use curdmate_types::conversation::FieldValue;
use curdmate_types::error::ValidationError;
use curdmate_types::record::{RecordField, RecordId};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern compiles"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Country-code token prepended to every stored phone number.
pub const PHONE_PREFIX: &str = "+91 ";

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !NAME_RE.is_match(trimmed) {
        return Err(ValidationError::new(
            "name",
            "Name can only contain letters and spaces.",
        ));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::new(
            "email",
            "That doesn't look like a valid email address. Please enter something like 'user@example.com'.",
        ));
    }
    Ok(trimmed.to_lowercase())
}

/// Whether `raw` is shaped like an email address.
pub fn looks_like_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

/// Strip every non-digit; exactly ten digits must remain.
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 {
        return Err(ValidationError::new(
            "phone",
            "Please enter a valid 10-digit phone number.",
        ));
    }
    Ok(format!("{PHONE_PREFIX}{digits}"))
}

/// Like [`validate_phone`], but input already carrying the `+91` country code
/// keeps only the ten digits that follow it.
pub fn validate_prefixed_phone(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("+91") {
        Some(rest) => validate_phone(rest),
        None => validate_phone(trimmed),
    }
}

pub fn validate_age(raw: &str) -> Result<u32, ValidationError> {
    let reject = || {
        ValidationError::new(
            "age",
            format!("Age must be a whole number between {MIN_AGE} and {MAX_AGE}."),
        )
    };
    let age: i64 = raw.trim().parse().map_err(|_| reject())?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(reject());
    }
    u32::try_from(age).map_err(|_| reject())
}

pub fn validate_address(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new(
            "address",
            "Address must contain at least one letter.",
        ));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_record_id(raw: &str) -> Result<RecordId, ValidationError> {
    RecordId::parse(raw).ok_or_else(|| {
        ValidationError::new(
            "record id",
            "Please provide a valid 24-character record ID (example: 507f1f77bcf86cd799439011).",
        )
    })
}

/// Validate `raw` with the validator for `field`.
pub fn validate_field(field: RecordField, raw: &str) -> Result<FieldValue, ValidationError> {
    match field {
        RecordField::Name => validate_name(raw).map(FieldValue::Text),
        RecordField::Email => validate_email(raw).map(FieldValue::Text),
        RecordField::Phone => validate_phone(raw).map(FieldValue::Text),
        RecordField::Age => validate_age(raw).map(FieldValue::Number),
        RecordField::Address => validate_address(raw).map(FieldValue::Text),
    }
}
