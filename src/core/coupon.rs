//! Coupon code generation.
//!
//! A code is the first 12 hex digits of a random v4 UUID, uppercased. The database's
//! UNIQUE constraint on `recipients.coupon_code` is the authority on uniqueness; the
//! dispatch workflow retries with a fresh code when an insert collides.

use uuid::Uuid;

/// Number of characters in an issued coupon code
pub const COUPON_CODE_LEN: usize = 12;

/// Source of candidate coupon codes.
pub trait CouponCodeGenerator: Send + Sync {
    /// Produces a new candidate code.
    fn next_code(&self) -> String;
}

/// Production generator backed by random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCouponCodes;

impl CouponCodeGenerator for UuidCouponCodes {
    fn next_code(&self) -> String {
        generate_coupon_code()
    }
}

/// Generates one 12-character uppercase alphanumeric coupon code.
#[must_use]
pub fn generate_coupon_code() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(COUPON_CODE_LEN);
    hex.to_ascii_uppercase()
}

/// Returns true if `code` has the shape of an issued coupon code.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == COUPON_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_coupon_code();
            assert!(is_well_formed(&code), "bad code: {code}");
        }
    }

    #[test]
    fn test_generated_codes_do_not_repeat() {
        let codes: HashSet<String> = (0..10_000).map(|_| UuidCouponCodes.next_code()).collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_is_well_formed_rejects_bad_codes() {
        assert!(!is_well_formed("abcdef123456"));
        assert!(!is_well_formed("ABC"));
        assert!(!is_well_formed("ABCDEF12345-"));
        assert!(is_well_formed("ABCDEF123456"));
    }
}
