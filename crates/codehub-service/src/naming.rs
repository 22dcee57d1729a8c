//! Name rules shared by projects, folders, and documents.

use codehub_core::error::AppError;
use codehub_core::result::AppResult;

/// Longest accepted name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Trim `name` and check it is usable as a project, folder, or document
/// name. `kind` is only used in error messages.
pub fn normalize_name(kind: &str, name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{kind} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "{kind} name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(AppError::validation(format!(
            "{kind} name cannot contain path separators"
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::validation(format!("'{trimmed}' is not a valid {kind} name")));
    }
    Ok(trimmed.to_string())
}
