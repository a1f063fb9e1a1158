//! Input validation functions
//!
//! This module provides validation utilities for profile input.

use crate::models::Theme;
use crate::types::UpdateProfileRequest;

/// Maximum accepted bio length, in characters
pub const MAX_BIO_CHARS: usize = 1000;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if !email.contains('@') || !email.contains('.') {
        return Err("Invalid email format".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate age in years (0-120)
pub fn validate_age(age: i32) -> Result<(), String> {
    if !(0..=120).contains(&age) {
        return Err("Age must be between 0 and 120".to_string());
    }
    Ok(())
}

/// Validate phone number
///
/// Digits with optional `+`, `-` and spaces; at least one digit.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let phone_regex = regex_lite::Regex::new(r"^[+\- 0-9]*[0-9][+\- 0-9]*$").unwrap();
    if !phone_regex.is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }
    if phone.len() > 32 {
        return Err("Phone number too long".to_string());
    }
    Ok(())
}

/// Validate interface language code (e.g. `en`, `ru`, `pt-br`)
pub fn validate_language(language: &str) -> Result<(), String> {
    let len = language.chars().count();
    if !(2..=8).contains(&len) {
        return Err("Language code must be 2 to 8 characters".to_string());
    }
    if !language.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return Err("Language code may only contain letters and '-'".to_string());
    }
    Ok(())
}

/// Validate theme
pub fn validate_theme(theme: &str) -> Result<(), String> {
    theme.parse::<Theme>().map(|_| ())
}

/// Validate bio length
pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > MAX_BIO_CHARS {
        return Err(format!("Bio cannot exceed {} characters", MAX_BIO_CHARS));
    }
    Ok(())
}

/// Validate every field present in a profile update
pub fn validate_profile_update(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    if let Some(bio) = &req.bio {
        validate_bio(bio).map_err(|e| ValidationError::new("bio", &e))?;
    }
    if let Some(email) = &req.email {
        validate_email(email).map_err(|e| ValidationError::new("email", &e))?;
    }
    if let Some(phone) = &req.phone {
        validate_phone(phone).map_err(|e| ValidationError::new("phone", &e))?;
    }
    if let Some(age) = req.age {
        validate_age(age).map_err(|e| ValidationError::new("age", &e))?;
    }
    if let Some(language) = &req.language {
        validate_language(language).map_err(|e| ValidationError::new("language", &e))?;
    }
    if let Some(theme) = &req.theme {
        validate_theme(theme).map_err(|e| ValidationError::new("theme", &e))?;
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "bio" => "Bio",
        "email" => "Email",
        "phone" => "Phone",
        "age" => "Age",
        "language" => "Language",
        "theme" => "Theme",
        "display_name" => "Display Name",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}
