//! Payment card validation and the mock payment authorizer.
//!
//! Card format is re-validated here, server-side; the calling UI's own
//! checks are a convenience only. Card data is never persisted.

use serde::Deserialize;

/// Card details submitted with a payment. All fields required.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    /// MM/YY
    pub expiry: String,
    pub cvc: String,
}

impl CardDetails {
    /// Validate card field formats. Returns a human-readable reason on the
    /// first failure, in field order.
    pub fn validate_format(&self) -> Result<(), String> {
        let digits = self.card_number.trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("Card number must contain only digits".into());
        }
        if !(13..=19).contains(&digits.len()) {
            return Err("Card number must be 13 to 19 digits".into());
        }

        if !is_valid_expiry(self.expiry.trim()) {
            return Err("Expiry must be in MM/YY format".into());
        }

        let cvc = self.cvc.trim();
        if !(cvc.len() == 3 || cvc.len() == 4) || !cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err("CVC must be 3 or 4 digits".into());
        }

        Ok(())
    }

    /// Whether any field is missing.
    pub fn has_missing_fields(&self) -> bool {
        self.card_number.trim().is_empty()
            || self.expiry.trim().is_empty()
            || self.cvc.trim().is_empty()
    }
}

fn is_valid_expiry(s: &str) -> bool {
    let Some((month, year)) = s.split_once('/') else {
        return false;
    };
    if month.len() != 2 || year.len() != 2 {
        return false;
    }
    if !month.chars().all(|c| c.is_ascii_digit()) || !year.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    matches!(month.parse::<u32>(), Ok(m) if (1..=12).contains(&m))
}

/// Seam for the payment authorization step. The production implementation
/// is a mock; a real gateway would slot in here.
pub trait PaymentAuthorizer {
    /// Attempt to authorize a charge. Returns true on success.
    fn authorize(&self, card: &CardDetails) -> bool;
}

/// Simulated authorizer. Always succeeds once format preconditions pass;
/// no real financial settlement occurs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockAuthorizer;

impl PaymentAuthorizer for MockAuthorizer {
    fn authorize(&self, _card: &CardDetails) -> bool {
        true
    }
}
