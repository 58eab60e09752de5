//! Input checks applied before anything is written.

use crate::error::{AppError, Result};

/// Rejects empty or whitespace-only required fields.
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_post(text: &str, delete_password: &str) -> Result<()> {
    require("text", text)?;
    require("delete_password", delete_password)
}
