//! Coupon eligibility rules.

use jiff::Timestamp;

use crate::domain::coupons::{
    data::FieldChecks,
    decision::DecisionOutcome,
    errors::{IntegrityFault, ValidationErrors},
    records::CouponRecord,
};

/// Validated lookup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CouponLookup {
    pub(crate) coupon_code: String,
    pub(crate) total_amount: u64,
}

pub(crate) fn check_lookup(
    coupon_code: &str,
    total_amount: i64,
) -> Result<CouponLookup, ValidationErrors> {
    let mut fields = FieldChecks::default();

    let coupon_code = fields.code("coupon_code", Some(coupon_code.to_string()));
    let total_amount = fields.non_negative("total_amount", Some(total_amount));

    match (coupon_code, total_amount) {
        (Some(coupon_code), Some(total_amount)) => Ok(CouponLookup {
            coupon_code,
            total_amount,
        }),
        _ => Err(fields.into_errors()),
    }
}

/// Pick the header to validate when a code matches several rows: the most
/// recently created, then the greatest UUID.
pub(crate) fn select_coupon(coupons: Vec<CouponRecord>) -> Option<CouponRecord> {
    coupons
        .into_iter()
        .max_by(|a, b| (a.created_at, a.uuid).cmp(&(b.created_at, b.uuid)))
}

/// Expiry then minimum spend. `None` means the coupon is eligible.
pub(crate) fn rejection(
    coupon: &CouponRecord,
    total_amount: u64,
    point_in_time: Timestamp,
) -> Option<DecisionOutcome> {
    if coupon.end_date < point_in_time {
        return Some(DecisionOutcome::Expired);
    }

    if total_amount < coupon.minimum_amount {
        return Some(DecisionOutcome::BelowMinimum);
    }

    None
}

/// Exactly one payload row must exist per header.
pub(crate) fn single_payload<T>(rows: Vec<T>) -> Result<T, IntegrityFault> {
    let count = rows.len();
    let mut rows = rows.into_iter();

    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        (None, _) => Err(IntegrityFault::MissingPayload),
        (Some(_), count) => Err(IntegrityFault::DuplicatePayload(count)),
    }
}
