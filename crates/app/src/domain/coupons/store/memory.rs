//! In-process coupon store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::coupons::{
    records::{
        CouponRecord, CouponUuid, DiscountRecord, FlatDiscountRecord, PercentDiscountRecord,
    },
    store::{CouponStore, StoreError, StoreItem},
};

#[derive(Debug, Default)]
struct Tables {
    coupons: HashMap<CouponUuid, CouponRecord>,
    coupons_by_code: HashMap<String, CouponUuid>,
    flat_discounts: HashMap<CouponUuid, FlatDiscountRecord>,
    percent_discounts: HashMap<CouponUuid, PercentDiscountRecord>,
}

impl Tables {
    /// Check a batch against current rows and against itself without writing.
    ///
    /// A payload must reference a header of its own discount type, and a
    /// header takes at most one payload of either type.
    fn check(&self, items: &[StoreItem]) -> Result<(), StoreError> {
        let mut coupons = HashMap::new();
        let mut codes = HashSet::new();
        let mut discounts = HashSet::new();

        for item in items {
            match item {
                StoreItem::Coupon(coupon) => {
                    if self.coupons_by_code.contains_key(&coupon.coupon_code)
                        || !codes.insert(coupon.coupon_code.as_str())
                    {
                        return Err(StoreError::DuplicateCode);
                    }

                    if self.coupons.contains_key(&coupon.uuid)
                        || coupons.insert(coupon.uuid, coupon.discount_type).is_some()
                    {
                        return Err(StoreError::DuplicateKey("coupons_pkey".to_string()));
                    }
                }
                StoreItem::Discount(discount) => {
                    let coupon = discount.coupon_uuid();

                    let header_type = self
                        .coupons
                        .get(&coupon)
                        .map(|header| header.discount_type)
                        .or_else(|| coupons.get(&coupon).copied());

                    if header_type != Some(discount.discount_type()) {
                        return Err(StoreError::InvalidReference);
                    }

                    if self.flat_discounts.contains_key(&coupon)
                        || self.percent_discounts.contains_key(&coupon)
                        || !discounts.insert(coupon)
                    {
                        return Err(StoreError::DuplicateKey(format!(
                            "{}_discounts_pkey",
                            discount.discount_type()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn insert(&mut self, item: StoreItem) {
        match item {
            StoreItem::Coupon(coupon) => {
                self.coupons_by_code
                    .insert(coupon.coupon_code.clone(), coupon.uuid);
                self.coupons.insert(coupon.uuid, coupon);
            }
            StoreItem::Discount(DiscountRecord::Flat(discount)) => {
                self.flat_discounts.insert(discount.coupon_uuid, discount);
            }
            StoreItem::Discount(DiscountRecord::Percent(discount)) => {
                self.percent_discounts.insert(discount.coupon_uuid, discount);
            }
        }
    }
}

/// Coupon store held in process memory.
///
/// Enforces the same unique code index, primary keys and typed coupon
/// references as the `PostgreSQL` schema. A batch is checked in full under the write lock
/// before any row is inserted.
#[derive(Debug, Default)]
pub struct MemoryCouponStore {
    tables: RwLock<Tables>,
}

impl MemoryCouponStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponStore for MemoryCouponStore {
    async fn put_items(&self, items: Vec<StoreItem>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        tables.check(&items)?;

        for item in items {
            tables.insert(item);
        }

        Ok(())
    }

    async fn query_coupons_by_code(
        &self,
        coupon_code: &str,
    ) -> Result<Vec<CouponRecord>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .coupons_by_code
            .get(coupon_code)
            .and_then(|uuid| tables.coupons.get(uuid))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn query_flat_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<FlatDiscountRecord>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables.flat_discounts.get(&coupon).cloned().into_iter().collect())
    }

    async fn query_percent_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<PercentDiscountRecord>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .percent_discounts
            .get(&coupon)
            .cloned()
            .into_iter()
            .collect())
    }
}
