//! Card field validation.
//!
//! Pure checks over the raw strings a customer typed at checkout. Nothing in
//! here touches the network or the order; the only way to obtain a
//! [`ValidatedCard`] is through [`CardValidator::validate`], so a payment
//! request can never be assembled from unchecked card fields.

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const MIN_PAN_DIGITS: usize = 13;
const MAX_PAN_DIGITS: usize = 19;

/// How far ahead a two-digit expiry year may point before it is read as
/// belonging to the previous century.
const EXPIRY_YEAR_WINDOW: i32 = 20;

/// Card fields exactly as submitted by the customer.
#[derive(Clone, Default, Deserialize)]
pub struct RawCardInput {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl RawCardInput {
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            expiry: expiry.into(),
            cvc: cvc.into(),
        }
    }
}

impl fmt::Debug for RawCardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCardInput")
            .field("number", &mask_digits(&strip_whitespace(&self.number)))
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .finish()
    }
}

/// Which card field a validation problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Number,
    Expiry,
    Cvc,
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardField::Number => "card number",
            CardField::Expiry => "card expiry date",
            CardField::Cvc => "card security code",
        };
        write!(f, "{}", s)
    }
}

/// A single, customer-facing card validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardFieldError {
    #[error("Please enter your {0}.")]
    Missing(CardField),

    #[error("Please enter a valid card number.")]
    InvalidNumber,

    #[error("Please enter a valid expiry date (MM/YY).")]
    InvalidExpiry,

    #[error("Please enter a valid card security code.")]
    InvalidCvc,
}

impl CardFieldError {
    pub fn field(&self) -> CardField {
        match self {
            CardFieldError::Missing(field) => *field,
            CardFieldError::InvalidNumber => CardField::Number,
            CardFieldError::InvalidExpiry => CardField::Expiry,
            CardFieldError::InvalidCvc => CardField::Cvc,
        }
    }
}

/// Card data that has passed every [`CardValidator`] rule.
///
/// Lives only for one authorization attempt. `Debug` prints the masked
/// number and never the CVC.
#[derive(Clone)]
pub struct ValidatedCard {
    number: SecretString,
    expiry: String,
    cvc: SecretString,
    last4: String,
}

impl ValidatedCard {
    /// Digits-only card number for the processor payload.
    pub fn number(&self) -> &str {
        self.number.expose_secret()
    }

    /// Normalized `MM/YY` expiry.
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    pub fn cvc(&self) -> &str {
        self.cvc.expose_secret()
    }

    pub fn last4(&self) -> &str {
        &self.last4
    }

    /// Display form safe for logs and order notes, e.g. `**** **** **** 1111`.
    pub fn masked(&self) -> String {
        mask_digits(self.number.expose_secret())
    }
}

impl fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("number", &self.masked())
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .finish()
    }
}

/// Stateless card field checks.
pub struct CardValidator;

impl CardValidator {
    /// Runs every rule and collects all failures, so the customer sees each
    /// problem at once.
    pub fn validate(input: &RawCardInput) -> Result<ValidatedCard, Vec<CardFieldError>> {
        Self::validate_at(input, Utc::now().date_naive())
    }

    /// Same as [`CardValidator::validate`] with an explicit "today".
    pub fn validate_at(
        input: &RawCardInput,
        today: NaiveDate,
    ) -> Result<ValidatedCard, Vec<CardFieldError>> {
        let number = strip_whitespace(&input.number);
        let expiry = strip_whitespace(&input.expiry);
        let cvc = input.cvc.trim().to_string();

        let mut errors = Vec::new();

        if number.is_empty() {
            errors.push(CardFieldError::Missing(CardField::Number));
        } else if !Self::validate_number(&number) {
            errors.push(CardFieldError::InvalidNumber);
        }

        if expiry.is_empty() {
            errors.push(CardFieldError::Missing(CardField::Expiry));
        } else if !Self::validate_expiry_at(&expiry, today) {
            errors.push(CardFieldError::InvalidExpiry);
        }

        if cvc.is_empty() {
            errors.push(CardFieldError::Missing(CardField::Cvc));
        } else if !Self::validate_cvc(&cvc) {
            errors.push(CardFieldError::InvalidCvc);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let last4 = number[number.len() - 4..].to_string();
        Ok(ValidatedCard {
            number: SecretString::new(number),
            expiry,
            cvc: SecretString::new(cvc),
            last4,
        })
    }

    /// Strips whitespace and checks the digit count (13-19).
    ///
    /// # Errors
    ///
    /// Returns `CardFieldError::InvalidNumber` when the input is not a run of
    /// 13 to 19 ASCII digits once whitespace is removed.
    pub fn normalize_number(raw: &str) -> Result<String, CardFieldError> {
        let digits = strip_whitespace(raw);
        let well_formed = (MIN_PAN_DIGITS..=MAX_PAN_DIGITS).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit());
        if well_formed {
            Ok(digits)
        } else {
            Err(CardFieldError::InvalidNumber)
        }
    }

    /// True when the number is well formed and passes the Luhn checksum.
    pub fn validate_number(raw: &str) -> bool {
        match Self::normalize_number(raw) {
            Ok(digits) => luhn_checksum_valid(&digits),
            Err(_) => false,
        }
    }

    /// True for a well-formed `MM/YY` that is not already expired.
    pub fn validate_expiry(raw: &str) -> bool {
        Self::validate_expiry_at(raw, Utc::now().date_naive())
    }

    /// Expiry check against an explicit "today". A card is valid through the
    /// whole of its expiry month.
    pub fn validate_expiry_at(raw: &str, today: NaiveDate) -> bool {
        let Some((month, year)) = parse_expiry(&strip_whitespace(raw)) else {
            return false;
        };
        if !(1..=12).contains(&month) {
            return false;
        }

        let full_year = expand_two_digit_year(year, today.year());
        (full_year, month) >= (today.year(), today.month())
    }

    /// True for 3 or 4 ASCII digits.
    pub fn validate_cvc(raw: &str) -> bool {
        let cvc = raw.trim();
        (3..=4).contains(&cvc.len()) && cvc.bytes().all(|b| b.is_ascii_digit())
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn mask_digits(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    if chars.len() < 4 {
        return "****".to_string();
    }
    let last4: String = chars[chars.len() - 4..].iter().collect();
    format!("**** **** **** {}", last4)
}

/// Doubles every second digit counted from the right, which for a left to
/// right walk means positions whose index shares the parity of the length.
fn luhn_checksum_valid(digits: &str) -> bool {
    let parity = digits.len() % 2;
    let sum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == parity {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// Parses `MM/YY` into (month, two-digit year).
fn parse_expiry(s: &str) -> Option<(u32, i32)> {
    let (mm, yy) = s.split_once('/')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(mm) || !two_digits(yy) {
        return None;
    }
    Some((mm.parse().ok()?, yy.parse().ok()?))
}

fn expand_two_digit_year(yy: i32, current_year: i32) -> i32 {
    let century = current_year - current_year.rem_euclid(100);
    let candidate = century + yy;
    if candidate > current_year + EXPIRY_YEAR_WINDOW {
        candidate - 100
    } else if candidate < current_year + EXPIRY_YEAR_WINDOW - 100 {
        candidate + 100
    } else {
        candidate
    }
}
