//! Coupon Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use coupons::discounts::{Discount, DiscountError};
use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Discount variant a coupon header points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountType {
    Flat,
    Percent,
}

impl DiscountType {
    #[must_use]
    pub const fn to_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Percent => "percent",
        }
    }

    #[must_use]
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "flat" => Some(Self::Flat),
            "percent" => Some(Self::Percent),
            _ => None,
        }
    }
}

impl Display for DiscountType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

/// Coupon Header Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub discount_type: DiscountType,
    pub coupon_code: String,
    pub minimum_amount: u64,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Discount payload identifier, `flat-<uuid>` or `percent-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscountId(String);

impl DiscountId {
    #[must_use]
    pub fn new(discount_type: DiscountType) -> Self {
        Self(format!("{discount_type}-{}", Uuid::now_v7()))
    }

    #[must_use]
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DiscountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Flat Discount Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatDiscountRecord {
    pub coupon_uuid: CouponUuid,
    pub discount_id: DiscountId,
    pub discount_amount: u64,
}

/// Percent Discount Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentDiscountRecord {
    pub coupon_uuid: CouponUuid,
    pub discount_id: DiscountId,
    pub discount_percentage: u8,
    pub maximum_amount: u64,
}

/// Type-specific payload joined to a coupon header by coupon UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountRecord {
    Flat(FlatDiscountRecord),
    Percent(PercentDiscountRecord),
}

impl DiscountRecord {
    #[must_use]
    pub fn coupon_uuid(&self) -> CouponUuid {
        match self {
            Self::Flat(record) => record.coupon_uuid,
            Self::Percent(record) => record.coupon_uuid,
        }
    }

    #[must_use]
    pub const fn discount_type(&self) -> DiscountType {
        match self {
            Self::Flat(_) => DiscountType::Flat,
            Self::Percent(_) => DiscountType::Percent,
        }
    }

    #[must_use]
    pub fn discount_id(&self) -> &DiscountId {
        match self {
            Self::Flat(record) => &record.discount_id,
            Self::Percent(record) => &record.discount_id,
        }
    }

    /// Convert the stored payload into its discount strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored percentage exceeds 100.
    pub fn to_discount(&self) -> Result<Discount, DiscountError> {
        match self {
            Self::Flat(record) => Ok(Discount::AmountOff {
                amount: record.discount_amount,
            }),
            Self::Percent(record) => {
                Discount::percentage_off(record.discount_percentage, record.maximum_amount)
            }
        }
    }
}
