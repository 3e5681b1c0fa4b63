//! Input validation shared by the registries

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::{DailyWindow, ValidityWindow};
use crate::utils::error::{RbacError, Result};

static PERMISSION_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z0-9_]+)+$").expect("permission code pattern is valid")
});

static ROLE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_.-]*$").expect("role code pattern is valid"));

pub(super) const MIN_LEVEL: u8 = 1;
pub(super) const MAX_LEVEL: u8 = 5;

/// `module.action` style codes, e.g. `products.delete`
pub(super) fn permission_code(code: &str) -> Result<()> {
    if PERMISSION_CODE.is_match(code) {
        Ok(())
    } else {
        Err(RbacError::validation(format!(
            "Invalid permission code '{}': expected dotted lowercase segments such as products.delete",
            code
        )))
    }
}

pub(super) fn role_code(code: &str) -> Result<()> {
    if ROLE_CODE.is_match(code) {
        Ok(())
    } else {
        Err(RbacError::validation(format!("Invalid role code '{}'", code)))
    }
}

pub(super) fn level(level: u8) -> Result<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(RbacError::validation(format!(
            "niveau must be within {}..={}, got {}",
            MIN_LEVEL, MAX_LEVEL, level
        )))
    }
}

pub(super) fn name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(RbacError::validation("nom must not be empty"))
    } else {
        Ok(())
    }
}

/// Motif required by suspension and revocation
pub(super) fn motif(reason: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        Err(RbacError::validation("A motif is required for this transition"))
    } else {
        Ok(reason.to_string())
    }
}

pub(super) fn validity_window(window: &ValidityWindow) -> Result<()> {
    match window.ends_at {
        Some(end) if end <= window.starts_at => Err(RbacError::validation(
            "date_fin must be later than date_debut",
        )),
        _ => Ok(()),
    }
}

pub(super) fn daily_window(window: &DailyWindow) -> Result<()> {
    if window.is_valid() {
        Ok(())
    } else {
        Err(RbacError::validation(format!(
            "Access hours {} are empty",
            window
        )))
    }
}
