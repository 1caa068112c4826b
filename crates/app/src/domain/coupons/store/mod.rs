//! Coupon Record Store
//!
//! Headers are addressable by UUID and by code; discount payloads by coupon
//! UUID. Batches are written atomically: either every item lands or none does.

use async_trait::async_trait;
use mockall::automock;
use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::domain::coupons::records::{
    CouponRecord, CouponUuid, DiscountRecord, FlatDiscountRecord, PercentDiscountRecord,
};

mod memory;
mod postgres;

pub use memory::MemoryCouponStore;
pub use postgres::PgCouponStore;

/// Unique constraint backing the coupon code index.
pub(crate) const COUPON_CODE_CONSTRAINT: &str = "coupons_coupon_code_key";

/// One row of a write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreItem {
    Coupon(CouponRecord),
    Discount(DiscountRecord),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("coupon code already exists")]
    DuplicateCode,

    #[error("record already exists: {0}")]
    DuplicateKey(String),

    #[error("discount references an unknown coupon")]
    InvalidReference,

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        match database_error.kind() {
            ErrorKind::UniqueViolation
                if database_error.constraint() == Some(COUPON_CODE_CONSTRAINT) =>
            {
                Self::DuplicateCode
            }
            ErrorKind::UniqueViolation => Self::DuplicateKey(
                database_error
                    .constraint()
                    .map_or_else(|| database_error.message().to_string(), str::to_string),
            ),
            ErrorKind::ForeignKeyViolation => Self::InvalidReference,
            _ => Self::Sql(error),
        }
    }
}

#[automock]
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Insert every item or none of them.
    async fn put_items(&self, items: Vec<StoreItem>) -> Result<(), StoreError>;

    /// Look up headers through the code index. Empty means not found.
    async fn query_coupons_by_code(
        &self,
        coupon_code: &str,
    ) -> Result<Vec<CouponRecord>, StoreError>;

    async fn query_flat_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<FlatDiscountRecord>, StoreError>;

    async fn query_percent_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<PercentDiscountRecord>, StoreError>;
}
