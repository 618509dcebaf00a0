//! CPF (Brazilian taxpayer registry number) parsing and validation.
//!
//! This module provides the canonical CPF type used across the backend.
//! A CPF is an 11-digit identifier whose two trailing digits are checksums
//! over the preceding nine, so validity can be decided offline.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Errors that can occur while validating a CPF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpfError {
    /// Input does not contain exactly 11 decimal digits
    WrongLength,
    /// All 11 digits are identical (numerically valid but rejected by convention)
    AllDigitsEqual,
    /// First check digit does not match
    InvalidChecksum1,
    /// Second check digit does not match
    InvalidChecksum2,
}

impl fmt::Display for CpfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpfError::WrongLength => write!(f, "CPF must contain exactly 11 digits"),
            CpfError::AllDigitsEqual => write!(f, "CPF with all digits equal is not valid"),
            CpfError::InvalidChecksum1 => write!(f, "CPF first check digit does not match"),
            CpfError::InvalidChecksum2 => write!(f, "CPF second check digit does not match"),
        }
    }
}

impl std::error::Error for CpfError {}

/// Result type for CPF validation.
pub type CpfResult<T> = Result<T, CpfError>;

/// A validated CPF in canonical form: exactly 11 ASCII decimal digits.
///
/// The only way to obtain one is [`Cpf::parse`], so holding a `Cpf` is
/// proof that both checksum equations held.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Validate raw form input and return the canonical CPF.
    ///
    /// Formatting punctuation (dots, dash) and any other non-digit noise
    /// is stripped before validation, so `"111.444.777-35"` and
    /// `"11144477735"` are equivalent inputs.
    pub fn parse(raw: &str) -> CpfResult<Self> {
        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.len() != 11 {
            return Err(CpfError::WrongLength);
        }

        if digits.iter().all(|&d| d == digits[0]) {
            return Err(CpfError::AllDigitsEqual);
        }

        if digits[9] != check_digit(&digits[..9], 10) {
            return Err(CpfError::InvalidChecksum1);
        }

        if digits[10] != check_digit(&digits[..10], 11) {
            return Err(CpfError::InvalidChecksum2);
        }

        let canonical = digits
            .iter()
            .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
            .collect();
        Ok(Self(canonical))
    }

    /// Get the canonical 11-digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render in the conventional display form `XXX.XXX.XXX-XX`.
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.0[0..3],
            &self.0[3..6],
            &self.0[6..9],
            &self.0[9..11]
        )
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute a CPF check digit.
///
/// Digits are weighted `first_weight, first_weight - 1, ..., 2`; the sum
/// is reduced mod 11 and remainders below 2 collapse to 0.
fn check_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();
    let r = sum % 11;
    if r < 2 {
        0
    } else {
        11 - r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_valid_cpf() {
        let cpf = Cpf::parse("111.444.777-35").unwrap();
        assert_eq!(cpf.as_str(), "11144477735");
    }

    #[test]
    fn accepts_unpunctuated_input() {
        let cpf = Cpf::parse("11144477735").unwrap();
        assert_eq!(cpf.as_str(), "11144477735");
    }

    #[test]
    fn strips_arbitrary_noise() {
        let cpf = Cpf::parse("  111 444 777 / 35 ").unwrap();
        assert_eq!(cpf.as_str(), "11144477735");
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(Cpf::parse("abc"), Err(CpfError::WrongLength));
        assert_eq!(Cpf::parse(""), Err(CpfError::WrongLength));
        assert_eq!(Cpf::parse("123.456.789-0"), Err(CpfError::WrongLength));
        assert_eq!(Cpf::parse("123456789012"), Err(CpfError::WrongLength));
    }

    #[test]
    fn rejects_all_digits_equal() {
        assert_eq!(Cpf::parse("000.000.000-00"), Err(CpfError::AllDigitsEqual));
        assert_eq!(Cpf::parse("11111111111"), Err(CpfError::AllDigitsEqual));
        assert_eq!(Cpf::parse("99999999999"), Err(CpfError::AllDigitsEqual));
    }

    #[test]
    fn rejects_bad_first_check_digit() {
        // Valid CPF with digit 10 perturbed
        assert_eq!(Cpf::parse("111.444.777-45"), Err(CpfError::InvalidChecksum1));
    }

    #[test]
    fn rejects_bad_second_check_digit() {
        // "123.456.789-00" happens to satisfy the first equation (r < 2)
        // but fails the second
        assert_eq!(Cpf::parse("123.456.789-00"), Err(CpfError::InvalidChecksum2));
        assert_eq!(Cpf::parse("111.444.777-36"), Err(CpfError::InvalidChecksum2));
    }

    #[test]
    fn revalidation_is_idempotent() {
        let first = Cpf::parse("111.444.777-35").unwrap();
        let second = Cpf::parse(first.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn formats_with_conventional_punctuation() {
        let cpf = Cpf::parse("11144477735").unwrap();
        assert_eq!(cpf.formatted(), "111.444.777-35");
    }

    #[test]
    fn serde_is_transparent() {
        let cpf = Cpf::parse("11144477735").unwrap();
        assert_eq!(serde_json::to_string(&cpf).unwrap(), "\"11144477735\"");
        let back: Cpf = serde_json::from_str("\"11144477735\"").unwrap();
        assert_eq!(back, cpf);
    }
}
