//! Test Helpers

use crate::domain::coupons::data::{FlatCouponDraft, PercentCouponDraft};

pub(crate) fn flat_draft(
    coupon_code: &str,
    minimum_amount: i64,
    discount_amount: i64,
    validity: i64,
) -> FlatCouponDraft {
    FlatCouponDraft {
        coupon_code: Some(coupon_code.to_string()),
        minimum_amount: Some(minimum_amount),
        discount_amount: Some(discount_amount),
        validity: Some(validity),
    }
}

pub(crate) fn percent_draft(
    coupon_code: &str,
    minimum_amount: i64,
    discount_percentage: i64,
    maximum_amount: i64,
    validity: i64,
) -> PercentCouponDraft {
    PercentCouponDraft {
        coupon_code: Some(coupon_code.to_string()),
        minimum_amount: Some(minimum_amount),
        discount_percentage: Some(discount_percentage),
        maximum_amount: Some(maximum_amount),
        validity: Some(validity),
    }
}
