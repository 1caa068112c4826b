//! Coupons Data
//!
//! Drafts hold issuance input as submitted at the boundary: every field may be
//! absent and numbers are signed. Converting a draft into a [`NewCoupon`]
//! validates every field and reports all failures at once.

use crate::domain::coupons::errors::{FieldError, FieldIssue, ValidationErrors};

/// Longest validity window a coupon may be issued with, in days.
pub const MAX_VALIDITY_DAYS: u8 = 30;

/// Highest discount percentage.
pub const MAX_DISCOUNT_PERCENTAGE: u8 = 100;

/// Flat Coupon Draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatCouponDraft {
    pub coupon_code: Option<String>,
    pub minimum_amount: Option<i64>,
    pub discount_amount: Option<i64>,
    pub validity: Option<i64>,
}

/// Percent Coupon Draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PercentCouponDraft {
    pub coupon_code: Option<String>,
    pub minimum_amount: Option<i64>,
    pub discount_percentage: Option<i64>,
    pub maximum_amount: Option<i64>,
    pub validity: Option<i64>,
}

/// Validated discount parameters for a new coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewDiscount {
    Flat {
        discount_amount: u64,
    },
    Percent {
        discount_percentage: u8,
        maximum_amount: u64,
    },
}

/// New Coupon Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub coupon_code: String,
    pub minimum_amount: u64,
    pub validity_days: u8,
    pub discount: NewDiscount,
}

impl TryFrom<FlatCouponDraft> for NewCoupon {
    type Error = ValidationErrors;

    fn try_from(draft: FlatCouponDraft) -> Result<Self, Self::Error> {
        let mut fields = FieldChecks::default();

        let coupon_code = fields.code("coupon_code", draft.coupon_code);
        let minimum_amount = fields.non_negative("minimum_amount", draft.minimum_amount);
        let discount_amount = fields.non_negative("discount_amount", draft.discount_amount);
        let validity_days = fields.bounded("validity", draft.validity, MAX_VALIDITY_DAYS);

        match (coupon_code, minimum_amount, discount_amount, validity_days) {
            (Some(coupon_code), Some(minimum_amount), Some(discount_amount), Some(validity_days)) => {
                Ok(Self {
                    coupon_code,
                    minimum_amount,
                    validity_days,
                    discount: NewDiscount::Flat { discount_amount },
                })
            }
            _ => Err(fields.into_errors()),
        }
    }
}

impl TryFrom<PercentCouponDraft> for NewCoupon {
    type Error = ValidationErrors;

    fn try_from(draft: PercentCouponDraft) -> Result<Self, Self::Error> {
        let mut fields = FieldChecks::default();

        let coupon_code = fields.code("coupon_code", draft.coupon_code);
        let minimum_amount = fields.non_negative("minimum_amount", draft.minimum_amount);
        let discount_percentage = fields.bounded(
            "discount_percentage",
            draft.discount_percentage,
            MAX_DISCOUNT_PERCENTAGE,
        );
        let maximum_amount = fields.non_negative("maximum_amount", draft.maximum_amount);
        let validity_days = fields.bounded("validity", draft.validity, MAX_VALIDITY_DAYS);

        match (
            coupon_code,
            minimum_amount,
            discount_percentage,
            maximum_amount,
            validity_days,
        ) {
            (
                Some(coupon_code),
                Some(minimum_amount),
                Some(discount_percentage),
                Some(maximum_amount),
                Some(validity_days),
            ) => Ok(Self {
                coupon_code,
                minimum_amount,
                validity_days,
                discount: NewDiscount::Percent {
                    discount_percentage,
                    maximum_amount,
                },
            }),
            _ => Err(fields.into_errors()),
        }
    }
}

/// Field validator that records every failure.
///
/// Each check returns `None` exactly when it has recorded an error.
#[derive(Debug, Default)]
pub(crate) struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    pub(crate) fn code(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        let Some(value) = value else {
            return self.fail(field, FieldIssue::Required);
        };

        let trimmed = value.trim();

        if trimmed.is_empty() {
            return self.fail(field, FieldIssue::Empty);
        }

        Some(trimmed.to_string())
    }

    pub(crate) fn non_negative(&mut self, field: &'static str, value: Option<i64>) -> Option<u64> {
        let Some(value) = value else {
            return self.fail(field, FieldIssue::Required);
        };

        u64::try_from(value).map_or_else(|_| self.fail(field, FieldIssue::Negative), Some)
    }

    pub(crate) fn bounded(
        &mut self,
        field: &'static str,
        value: Option<i64>,
        max: u8,
    ) -> Option<u8> {
        let Some(value) = value else {
            return self.fail(field, FieldIssue::Required);
        };

        match u8::try_from(value) {
            Ok(value) if value <= max => Some(value),
            _ => self.fail(
                field,
                FieldIssue::OutOfRange {
                    min: 0,
                    max: i64::from(max),
                },
            ),
        }
    }

    pub(crate) fn into_errors(self) -> ValidationErrors {
        ValidationErrors::new(self.errors)
    }

    fn fail<T>(&mut self, field: &'static str, issue: FieldIssue) -> Option<T> {
        self.errors.push(FieldError { field, issue });

        None
    }
}
