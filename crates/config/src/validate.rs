// Range validation for job settings
// Collects every violation instead of stopping at the first one.

use thiserror::Error;

use crate::limits::{Limits, MIN_PAGE_SEARCH_SIZE};
use crate::settings::SettingsModel;
use crate::tri_state::TriState;

/// Accumulated validation failures.
///
/// Empty means valid. The caller decides whether violations block the
/// operation; nothing here panics or bails early.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation Failed: {}", numbered(.errors))]
pub struct ValidationErrors {
    errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// "1: first;2: second;"
fn numbered(errors: &[String]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, error)| format!("{}: {};", i + 1, error))
        .collect()
}

impl SettingsModel {
    /// Check value ranges against the injected `limits`.
    pub fn validate(&self, limits: &Limits) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.validate_into(limits, &mut errors);
        errors
    }

    /// Append this model's violations to an existing accumulator, so callers
    /// validating a larger document can report everything at once.
    pub fn validate_into(&self, limits: &Limits, errors: &mut ValidationErrors) {
        if let TriState::Value(size) = self.max_page_search_size_raw() {
            let max = i64::from(limits.max_buckets);
            let v = i64::from(size);
            if v < i64::from(MIN_PAGE_SEARCH_SIZE) || v > max {
                errors.add_error(format!(
                    "settings.max_page_search_size [{size}] is out of range. \
                     The minimum value is {MIN_PAGE_SEARCH_SIZE} and the maximum is {max}"
                ));
            }
        }
    }
}
