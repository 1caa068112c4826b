//! Coupons service errors.

use std::fmt::{Display, Formatter, Result as FmtResult};

use coupons::discounts::DiscountError;
use thiserror::Error;

use crate::domain::coupons::{records::CouponUuid, store::StoreError};

/// What is wrong with a single input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldIssue {
    #[error("is required")]
    Required,

    #[error("must not be empty")]
    Empty,

    #[error("must not be negative")]
    Negative,

    #[error("must be between {min} and {max}")]
    OutOfRange { min: i64, max: i64 },

    #[error("ends the validity window past the latest representable date")]
    WindowOverflow,
}

/// A rejected input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub issue: FieldIssue,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.field, self.issue)
    }
}

/// Every field that failed validation, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    #[must_use]
    pub fn issue_for(&self, field: &str) -> Option<FieldIssue> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.issue)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }

            Display::fmt(error, f)?;
        }

        Ok(())
    }
}

/// Stored coupon data that breaks the one-header-one-payload invariant.
#[derive(Debug, Error)]
pub enum IntegrityFault {
    #[error("discount payload is missing")]
    MissingPayload,

    #[error("{0} discount payloads found")]
    DuplicatePayload(usize),

    #[error("stored discount cannot be applied")]
    Discount(#[source] DiscountError),
}

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("coupon code already exists")]
    AlreadyExists,

    #[error("storage error")]
    Persistence(#[source] StoreError),

    #[error("coupon {coupon} is inconsistent: {fault}")]
    Integrity {
        coupon: CouponUuid,
        #[source]
        fault: IntegrityFault,
    },
}

impl From<StoreError> for CouponsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateCode => Self::AlreadyExists,
            other => Self::Persistence(other),
        }
    }
}
