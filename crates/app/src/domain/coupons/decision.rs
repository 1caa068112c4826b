//! Discount Decisions

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Terminal state of a coupon validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionOutcome {
    Applied,
    NotFound,
    Expired,
    BelowMinimum,
}

impl DecisionOutcome {
    #[must_use]
    pub const fn to_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::BelowMinimum => "below_minimum",
        }
    }

    /// Customer-facing explanation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Applied => "Success - your coupon has been applied.",
            Self::NotFound => "Sorry, could not find your coupon!",
            Self::Expired => "Sorry, your coupon has been expired!",
            Self::BelowMinimum => "Your cart value is less than minimum amount.",
        }
    }
}

impl Display for DecisionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

/// Discount Decision
///
/// Rejections always carry a zero discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountDecision {
    outcome: DecisionOutcome,
    discount: u64,
}

impl DiscountDecision {
    #[must_use]
    pub const fn applied(discount: u64) -> Self {
        Self {
            outcome: DecisionOutcome::Applied,
            discount,
        }
    }

    #[must_use]
    pub const fn rejected(outcome: DecisionOutcome) -> Self {
        Self {
            outcome,
            discount: 0,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> DecisionOutcome {
        self.outcome
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.outcome, DecisionOutcome::Applied)
    }

    /// Discount in minor units.
    #[must_use]
    pub const fn discount(&self) -> u64 {
        self.discount
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.outcome.message()
    }
}
