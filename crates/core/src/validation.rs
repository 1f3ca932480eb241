//! Presence checks for write payloads.

use crate::error::CoreError;

/// Check that every named field carries a non-blank value.
///
/// A field counts as missing when it is `None`, empty, or whitespace only.
/// All missing fields are reported together, in the order given.
///
/// ```
/// use portfolio_core::validation::require_fields;
///
/// assert!(require_fields(&[("title", Some("A"))]).is_ok());
/// assert!(require_fields(&[("title", Some("  "))]).is_err());
/// ```
pub fn require_fields(fields: &[(&'static str, Option<&str>)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}
