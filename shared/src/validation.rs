//! Validation utilities for the E-Commerce Admin Platform
//!
//! Write-boundary checks shared by the backend services and the WASM module.

use crate::models::VariantOptions;

/// Maximum number of option attributes on one variant
pub const MAX_VARIANT_OPTIONS: usize = 20;
/// Maximum length of an option attribute name
pub const MAX_OPTION_NAME_LEN: usize = 50;
/// Maximum length of an option attribute value
pub const MAX_OPTION_VALUE_LEN: usize = 100;
/// Maximum length of a movement reason note
pub const MAX_MOVEMENT_REASON_LEN: usize = 500;
/// Maximum length of a movement correlation reference
pub const MAX_MOVEMENT_REFERENCE_LEN: usize = 100;

/// Validate a variant's typed option mapping
pub fn validate_variant_options(options: &VariantOptions) -> Result<(), &'static str> {
    if options.len() > MAX_VARIANT_OPTIONS {
        return Err("Too many option attributes");
    }
    for (name, value) in &options.0 {
        if name.trim().is_empty() {
            return Err("Option attribute name cannot be empty");
        }
        if name.len() > MAX_OPTION_NAME_LEN {
            return Err("Option attribute name too long");
        }
        if value.trim().is_empty() {
            return Err("Option attribute value cannot be empty");
        }
        if value.len() > MAX_OPTION_VALUE_LEN {
            return Err("Option attribute value too long");
        }
    }
    Ok(())
}

/// Validate a movement reason note (human-readable text only)
pub fn validate_movement_reason(reason: Option<&str>) -> Result<(), &'static str> {
    match reason {
        Some(r) if r.len() > MAX_MOVEMENT_REASON_LEN => Err("Reason too long"),
        Some(r) if r.trim().is_empty() => Err("Reason cannot be blank"),
        _ => Ok(()),
    }
}

/// Validate a movement correlation reference (order id, sync-run id, ...)
pub fn validate_movement_reference(reference: Option<&str>) -> Result<(), &'static str> {
    match reference {
        Some(r) if r.len() > MAX_MOVEMENT_REFERENCE_LEN => Err("Reference too long"),
        Some(r) if r.trim().is_empty() => Err("Reference cannot be blank"),
        _ => Ok(()),
    }
}
