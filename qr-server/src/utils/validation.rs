//! Input validation helpers
//!
//! The empty-field contract: every string parameter is trimmed, and a
//! parameter that is empty after trimming fails the request — including
//! optional parameters that were supplied blank.

use crate::core::{AppError, AppResult};

/// Validate a required string parameter, returning its trimmed value.
pub fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional string parameter. Absent is fine; present-but-blank
/// is not.
pub fn optional(field: &str, value: Option<&str>) -> AppResult<Option<String>> {
    value.map(|v| required(field, v)).transpose()
}

/// Case-fold an email the way the account natural key is stored.
pub fn fold_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("email", "  a@x.io  ").unwrap(), "a@x.io");
        assert!(required("email", "   ").is_err());
        assert!(required("email", "").is_err());
    }

    #[test]
    fn optional_accepts_absence_but_not_blank() {
        assert_eq!(optional("image", None).unwrap(), None);
        assert_eq!(optional("image", Some(" x.png ")).unwrap().as_deref(), Some("x.png"));
        assert!(optional("image", Some("  ")).is_err());
    }
}
