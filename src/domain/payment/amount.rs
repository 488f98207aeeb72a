//! Conversion between decimal amounts and processor minor units.
//!
//! The processor API speaks integer minor units (cents). Amounts are rounded
//! to two decimal places with banker's rounding (`MidpointNearestEven`), so
//! `0.125` becomes `12` and `0.135` becomes `14`, before scaling by 100.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Largest amount, in major units, the processor accepts in one call.
pub fn default_max_amount() -> Decimal {
    Decimal::new(99_999_999, 2)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount must be greater than zero (got {0})")]
    NonPositive(Decimal),

    #[error("Amount {amount} exceeds maximum allowed value {max}")]
    ExceedsMaximum { amount: Decimal, max: Decimal },

    #[error("Amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),
}

/// Converts between decimal amounts and minor units under a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountCodec {
    max_amount: Decimal,
}

impl Default for AmountCodec {
    fn default() -> Self {
        Self::new(default_max_amount())
    }
}

impl AmountCodec {
    pub fn new(max_amount: Decimal) -> Self {
        Self { max_amount }
    }

    pub fn max_amount(&self) -> Decimal {
        self.max_amount
    }

    /// Converts a decimal amount into minor units.
    ///
    /// # Errors
    ///
    /// - `NonPositive` if the amount, after rounding, is zero or below
    /// - `ExceedsMaximum` if the amount is above the configured ceiling
    pub fn to_minor_units(&self, amount: Decimal) -> Result<i64, AmountError> {
        if amount <= Decimal::ZERO {
            return Err(AmountError::NonPositive(amount));
        }
        if amount > self.max_amount {
            return Err(AmountError::ExceedsMaximum {
                amount,
                max: self.max_amount,
            });
        }

        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        let minor = (rounded * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(AmountError::Unrepresentable(amount))?;

        if minor <= 0 {
            return Err(AmountError::NonPositive(amount));
        }
        Ok(minor)
    }

    /// Converts minor units back to a two-decimal amount.
    pub fn from_minor_units(minor: i64) -> Decimal {
        Decimal::new(minor, 2)
    }

    /// True for exactly three uppercase ASCII letters (ISO 4217 shape).
    pub fn currency_valid(code: &str) -> bool {
        code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
    }
}
