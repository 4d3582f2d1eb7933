//! Input validation for identifiers and required query parameters.

use crate::error::CoreError;

/// Maximum length of an office id (e.g. `SWT`, `LRL`).
pub const MAX_OFFICE_ID_LEN: usize = 16;

/// Maximum length of a project, location, parameter or application id.
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Validate an office id: non-empty, short, alphanumeric.
pub fn validate_office_id(office_id: &str) -> Result<(), CoreError> {
    if office_id.is_empty() {
        return Err(CoreError::Validation(
            "Office id must not be empty".to_string(),
        ));
    }
    if office_id.len() > MAX_OFFICE_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Office id must not exceed {MAX_OFFICE_ID_LEN} characters"
        )));
    }
    if !office_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation(
            "Office id may only contain ASCII letters and digits".to_string(),
        ));
    }
    Ok(())
}

/// Validate a free-form identifier named `field`.
///
/// Identifiers are used as cursor key parts, so the cursor delimiter is
/// rejected along with empty and overlong values.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if value.contains(crate::cursor::DELIMITER) {
        return Err(CoreError::Validation(format!(
            "{field} must not contain '{}'",
            crate::cursor::DELIMITER
        )));
    }
    Ok(())
}

/// A profile's parameter list must be non-empty, free of duplicates, and
/// contain its key parameter.
pub fn validate_parameter_list(key_parameter_id: &str, parameters: &[String]) -> Result<(), CoreError> {
    if parameters.is_empty() {
        return Err(CoreError::Validation(
            "Parameter list must not be empty".to_string(),
        ));
    }
    for (i, parameter) in parameters.iter().enumerate() {
        validate_identifier("Parameter id", parameter)?;
        if parameters[..i].contains(parameter) {
            return Err(CoreError::Validation(format!(
                "Parameter {parameter} appears more than once"
            )));
        }
    }
    if !parameters.iter().any(|p| p == key_parameter_id) {
        return Err(CoreError::Validation(format!(
            "Key parameter {key_parameter_id} must be in the parameter list"
        )));
    }
    Ok(())
}

/// Collect every missing `(name, value)` pair into one error.
///
/// ```ignore
/// require_params(&[("office", q.office.as_deref()), ("lock-id", q.lock_id.as_deref())])?;
/// ```
pub fn require_params(params: &[(&str, Option<&str>)]) -> Result<(), CoreError> {
    let missing: Vec<String> = params
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::MissingParameters(missing))
    }
}
