//! Input validation helpers

use crate::utils::AppError;

/// Notes left by guests or staff
pub const MAX_NOTE_LEN: usize = 500;

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.chars().count() > max_len {
            return Err(AppError::validation(format!(
                "{field} is too long ({} chars, max {max_len})",
                v.chars().count()
            )));
        }
    }
    Ok(())
}

/// Ids are positive snowflakes
pub fn validate_id(value: i64, field: &str) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::validation(format!("{field} must be positive, got {value}")));
    }
    Ok(())
}
