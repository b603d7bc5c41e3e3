//! Plus Code (Open Location Code) validation.
//!
//! Buyers may attach a Plus Code to their delivery address as a precise
//! geocode supplement. Codes are produced client-side from device
//! geolocation; the server only validates the format and stores the string.
//!
//! A full code looks like `5HM2JQRV+QR` (8 digits, a `+` separator, then 2 or
//! more refinement digits). Short area codes may pad the leading digits with
//! `0` (e.g. `5HM20000+`).

use serde::{Deserialize, Serialize};

/// The 20 digits of the Open Location Code alphabet.
const ALPHABET: &str = "23456789CFGHJMPQRVWX";

/// Position of the `+` separator in a full code.
const SEPARATOR_POSITION: usize = 8;

/// Maximum digits after the separator.
const MAX_SUFFIX_LENGTH: usize = 7;

/// Errors that can occur when parsing a [`PlusCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlusCodeError {
    #[error("plus code cannot be empty")]
    Empty,
    #[error("plus code must contain a '+' separator at position {SEPARATOR_POSITION}")]
    MisplacedSeparator,
    #[error("invalid plus code digit: {0}")]
    InvalidDigit(char),
    #[error("padding '0' digits must be trailing and come in pairs")]
    BadPadding,
    #[error("plus code suffix must have 2 to {MAX_SUFFIX_LENGTH} digits")]
    BadSuffixLength,
}

/// A validated full Plus Code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlusCode(String);

impl PlusCode {
    /// Parse and normalize a full Plus Code.
    ///
    /// Accepts lowercase input; the stored form is uppercase.
    ///
    /// # Errors
    ///
    /// Returns a [`PlusCodeError`] describing the first structural problem
    /// found.
    pub fn parse(s: &str) -> Result<Self, PlusCodeError> {
        let code = s.trim().to_uppercase();
        if code.is_empty() {
            return Err(PlusCodeError::Empty);
        }

        let Some((prefix, suffix)) = code.split_once('+') else {
            return Err(PlusCodeError::MisplacedSeparator);
        };
        if prefix.len() != SEPARATOR_POSITION {
            return Err(PlusCodeError::MisplacedSeparator);
        }
        if suffix.contains('+') {
            return Err(PlusCodeError::MisplacedSeparator);
        }

        // Prefix: code digits, optionally followed by trailing '0' padding in
        // pairs. Padded codes carry no suffix.
        let padding_start = prefix.find('0').unwrap_or(prefix.len());
        let (digits, padding) = prefix.split_at(padding_start);
        if let Some(bad) = digits.chars().find(|c| !ALPHABET.contains(*c)) {
            return Err(PlusCodeError::InvalidDigit(bad));
        }
        if !padding.is_empty() {
            if padding.chars().any(|c| c != '0') || padding.len() % 2 != 0 {
                return Err(PlusCodeError::BadPadding);
            }
            if !suffix.is_empty() {
                return Err(PlusCodeError::BadPadding);
            }
            return Ok(Self(code));
        }

        if !suffix.is_empty() {
            if suffix.len() < 2 || suffix.len() > MAX_SUFFIX_LENGTH {
                return Err(PlusCodeError::BadSuffixLength);
            }
            if let Some(bad) = suffix.chars().find(|c| !ALPHABET.contains(*c)) {
                return Err(PlusCodeError::InvalidDigit(bad));
            }
        }

        Ok(Self(code))
    }

    /// The normalized code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_full_codes() {
        // Santa Cruz de la Sierra and San Julian, from real encodings.
        assert!(PlusCode::parse("5HJ86R89+M5").is_ok());
        assert!(PlusCode::parse("5HM4494J+6G").is_ok());
        assert!(PlusCode::parse("8FVC9G8F+6X").is_ok());
    }

    #[test]
    fn test_lowercase_is_normalized() {
        let code = PlusCode::parse("8fvc9g8f+6x").unwrap();
        assert_eq!(code.as_str(), "8FVC9G8F+6X");
    }

    #[test]
    fn test_padded_area_code() {
        assert!(PlusCode::parse("8FVC0000+").is_ok());
        // Padding must be trailing pairs with no suffix.
        assert!(PlusCode::parse("8FV00000+6X").is_err());
        assert!(PlusCode::parse("8FVC000+").is_err());
    }

    #[test]
    fn test_separator_position() {
        assert!(matches!(
            PlusCode::parse("8FVC9G8F6X"),
            Err(PlusCodeError::MisplacedSeparator)
        ));
        assert!(matches!(
            PlusCode::parse("8FVC+9G8F6X"),
            Err(PlusCodeError::MisplacedSeparator)
        ));
    }

    #[test]
    fn test_rejects_invalid_digits() {
        // 'A' and '1' are not in the OLC alphabet.
        assert!(matches!(
            PlusCode::parse("8FVA9G8F+6X"),
            Err(PlusCodeError::InvalidDigit('A'))
        ));
        assert!(matches!(
            PlusCode::parse("8FVC9G8F+61"),
            Err(PlusCodeError::InvalidDigit('1'))
        ));
    }

    #[test]
    fn test_suffix_length_bounds() {
        assert!(matches!(
            PlusCode::parse("8FVC9G8F+6"),
            Err(PlusCodeError::BadSuffixLength)
        ));
        assert!(PlusCode::parse("8FVC9G8F+6XQRJMW").is_ok());
        assert!(matches!(
            PlusCode::parse("8FVC9G8F+6XQRJMWC"),
            Err(PlusCodeError::BadSuffixLength)
        ));
    }

    #[test]
    fn test_empty() {
        assert!(matches!(PlusCode::parse("   "), Err(PlusCodeError::Empty)));
    }
}
