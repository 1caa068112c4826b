//! Discounts
//!
//! Each coupon carries exactly one discount strategy. Strategies are pure: they
//! take the cart total in minor units and return the reduction in minor units.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Highest percentage a percent discount may take.
pub const MAX_PERCENTAGE: u8 = 100;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage above [`MAX_PERCENTAGE`].
    #[error("discount percentage {0} exceeds 100")]
    PercentageOutOfRange(u8),

    /// Percentage calculation could not be safely converted back to minor units.
    #[error("percentage calculation overflowed")]
    PercentConversion,
}

/// Discount strategy attached to a coupon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Discount {
    /// Subtract a fixed amount (e.g. "£10 off"), independent of the cart total.
    AmountOff {
        /// Reduction in minor units.
        amount: u64,
    },

    /// Take a percentage of the cart total, never more than `maximum`.
    PercentageOff {
        /// Whole percent, `0..=100`.
        percentage: u8,

        /// Cap on the computed reduction, in minor units.
        maximum: u64,
    },
}

impl Discount {
    /// Build a percent discount, rejecting percentages above 100.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentageOutOfRange`] when `percentage > 100`.
    pub fn percentage_off(percentage: u8, maximum: u64) -> Result<Self, DiscountError> {
        if percentage > MAX_PERCENTAGE {
            return Err(DiscountError::PercentageOutOfRange(percentage));
        }

        Ok(Self::PercentageOff {
            percentage,
            maximum,
        })
    }

    /// Calculate the reduction this discount yields on `total` minor units.
    ///
    /// The result is not clamped to `total`; a flat discount larger than the cart
    /// is returned in full.
    ///
    /// # Errors
    ///
    /// Returns an error when the percentage is out of range or the calculation
    /// cannot be represented in minor units.
    pub fn amount_for(&self, total: u64) -> Result<u64, DiscountError> {
        match *self {
            Self::AmountOff { amount } => Ok(amount),
            Self::PercentageOff {
                percentage,
                maximum,
            } => {
                if percentage > MAX_PERCENTAGE {
                    return Err(DiscountError::PercentageOutOfRange(percentage));
                }

                Ok(percent_of_minor(percentage, total)?.min(maximum))
            }
        }
    }
}

/// Calculate `percentage`% of a minor unit amount.
///
/// Uses exact decimal arithmetic and rounds half a minor unit away from zero,
/// so 15% of 10 (1.5) becomes 2.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result does not fit in `u64`.
pub fn percent_of_minor(percentage: u8, minor: u64) -> Result<u64, DiscountError> {
    let rate = Decimal::new(i64::from(percentage), 2);

    Decimal::from(minor)
        .checked_mul(rate)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}
