//! Form-boundary validation shared by the API handlers and the client.
//!
//! Every function returns [`CoreError::Validation`] with a message fit for
//! direct display next to the offending field.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length of a project name, in characters.
pub const MAX_PROJECT_NAME_LEN: usize = 200;
/// Maximum length of a task title, in characters.
pub const MAX_TASK_TITLE_LEN: usize = 500;
/// Minimum password length for registered accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim a project name and reject it when empty or too long.
pub fn validate_project_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Project name is required".into()));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Project name must be at most {MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional project description: whitespace-only becomes `None`.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// A description is mandatory when it feeds task generation.
pub fn validate_generation_description(description: &str) -> Result<String, CoreError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Project description is required to generate tasks".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim a task title and reject it when empty or too long.
pub fn validate_task_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Task title is required".into()));
    }
    if trimmed.chars().count() > MAX_TASK_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Task title must be at most {MAX_TASK_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Estimated hours, when present, must be a finite non-negative number.
pub fn validate_estimated_hours(hours: Option<f64>) -> Result<(), CoreError> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(CoreError::Validation(
            "estimated_hours must be a non-negative number".into(),
        )),
        _ => Ok(()),
    }
}

/// Lower-case and validate an email address.
pub fn validate_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_lowercase();
    if !normalized.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{normalized}' is not a valid email address"
        )));
    }
    Ok(normalized)
}

/// Enforce the minimum password length.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}
