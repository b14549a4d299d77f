//! IMEI format and uniqueness rules

use crate::error::{ImeiError, ImeiIssue, ImeiViolation};
use std::collections::HashSet;

/// Accepted IMEI shape: ASCII digits only, length within `[min_len, max_len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImeiRule {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for ImeiRule {
    fn default() -> Self {
        Self {
            min_len: 14,
            max_len: 16,
        }
    }
}

impl ImeiRule {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    /// First problem with a single value, if any
    pub fn check(&self, value: &str) -> Option<ImeiIssue> {
        if value.is_empty() {
            return Some(ImeiIssue::Empty);
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Some(ImeiIssue::NonDigit);
        }
        let len = value.len();
        if len < self.min_len || len > self.max_len {
            return Some(ImeiIssue::BadLength { len });
        }
        None
    }

    /// Validate a full capture: slot count, then per-slot format (all
    /// violations reported together), then pairwise uniqueness.
    pub fn validate(&self, expected_slots: usize, values: &[String]) -> Result<(), ImeiError> {
        if values.len() != expected_slots {
            return Err(ImeiError::SlotCountMismatch {
                expected: expected_slots,
                actual: values.len(),
            });
        }

        let violations: Vec<ImeiViolation> = values
            .iter()
            .enumerate()
            .filter_map(|(slot, v)| self.check(v).map(|issue| ImeiViolation { slot, issue }))
            .collect();
        if !violations.is_empty() {
            return Err(ImeiError::InvalidFormat { violations });
        }

        let mut seen = HashSet::new();
        for value in values {
            if !seen.insert(value.as_str()) {
                return Err(ImeiError::Duplicate {
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}
