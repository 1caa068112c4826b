//! Coupon issuance: turns a validated [`NewCoupon`] into the header and payload
//! records written to the store in one batch.

use jiff::{SignedDuration, Timestamp};

use crate::domain::coupons::{
    data::{NewCoupon, NewDiscount},
    errors::{FieldError, FieldIssue, ValidationErrors},
    records::{
        CouponRecord, CouponUuid, DiscountId, DiscountRecord, DiscountType, FlatDiscountRecord,
        PercentDiscountRecord,
    },
    store::StoreItem,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Header and payload for one coupon, ready to persist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IssuedCoupon {
    pub(crate) coupon: CouponRecord,
    pub(crate) discount: DiscountRecord,
}

impl IssuedCoupon {
    pub(crate) fn store_items(&self) -> Vec<StoreItem> {
        vec![
            StoreItem::Coupon(self.coupon.clone()),
            StoreItem::Discount(self.discount.clone()),
        ]
    }
}

/// Assign identifiers and the validity window starting at `point_in_time`.
pub(crate) fn prepare(
    coupon: NewCoupon,
    point_in_time: Timestamp,
) -> Result<IssuedCoupon, ValidationErrors> {
    let end_date = validity_end(point_in_time, coupon.validity_days)?;
    let uuid = CouponUuid::new();

    let discount = match coupon.discount {
        NewDiscount::Flat { discount_amount } => DiscountRecord::Flat(FlatDiscountRecord {
            coupon_uuid: uuid,
            discount_id: DiscountId::new(DiscountType::Flat),
            discount_amount,
        }),
        NewDiscount::Percent {
            discount_percentage,
            maximum_amount,
        } => DiscountRecord::Percent(PercentDiscountRecord {
            coupon_uuid: uuid,
            discount_id: DiscountId::new(DiscountType::Percent),
            discount_percentage,
            maximum_amount,
        }),
    };

    Ok(IssuedCoupon {
        coupon: CouponRecord {
            uuid,
            discount_type: discount.discount_type(),
            coupon_code: coupon.coupon_code,
            minimum_amount: coupon.minimum_amount,
            start_date: point_in_time,
            end_date,
            created_at: point_in_time,
            updated_at: point_in_time,
        },
        discount,
    })
}

/// `start + days` whole 24 hour days.
pub(crate) fn validity_end(start: Timestamp, days: u8) -> Result<Timestamp, ValidationErrors> {
    let window = SignedDuration::from_secs(i64::from(days) * SECONDS_PER_DAY);

    start.checked_add(window).map_err(|_| {
        ValidationErrors::new(vec![FieldError {
            field: "validity",
            issue: FieldIssue::WindowOverflow,
        }])
    })
}
