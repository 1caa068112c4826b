//! `PostgreSQL` coupon store.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::Db,
    domain::coupons::{
        records::{
            CouponRecord, CouponUuid, DiscountId, DiscountRecord, DiscountType,
            FlatDiscountRecord, PercentDiscountRecord,
        },
        store::{CouponStore, StoreError, StoreItem},
    },
};

const COLUMN_MINIMUM_AMOUNT: &str = "minimum_amount";
const COLUMN_DISCOUNT_AMOUNT: &str = "discount_amount";
const COLUMN_DISCOUNT_PERCENTAGE: &str = "discount_percentage";
const COLUMN_MAXIMUM_AMOUNT: &str = "maximum_amount";

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const CREATE_FLAT_DISCOUNT_SQL: &str = include_str!("sql/create_flat_discount.sql");
const CREATE_PERCENT_DISCOUNT_SQL: &str = include_str!("sql/create_percent_discount.sql");
const FIND_COUPONS_BY_CODE_SQL: &str = include_str!("sql/find_coupons_by_code.sql");
const FIND_FLAT_DISCOUNTS_SQL: &str = include_str!("sql/find_flat_discounts.sql");
const FIND_PERCENT_DISCOUNTS_SQL: &str = include_str!("sql/find_percent_discounts.sql");

/// Coupon store backed by `PostgreSQL`. Each batch is one transaction.
#[derive(Debug, Clone)]
pub struct PgCouponStore {
    db: Db,
}

impl PgCouponStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CouponStore for PgCouponStore {
    async fn put_items(&self, items: Vec<StoreItem>) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        for item in &items {
            match item {
                StoreItem::Coupon(coupon) => insert_coupon(&mut tx, coupon).await?,
                StoreItem::Discount(DiscountRecord::Flat(discount)) => {
                    insert_flat_discount(&mut tx, discount).await?;
                }
                StoreItem::Discount(DiscountRecord::Percent(discount)) => {
                    insert_percent_discount(&mut tx, discount).await?;
                }
            }
        }

        tx.commit().await?;

        Ok(())
    }

    async fn query_coupons_by_code(
        &self,
        coupon_code: &str,
    ) -> Result<Vec<CouponRecord>, StoreError> {
        let coupons = query_as::<Postgres, CouponRecord>(FIND_COUPONS_BY_CODE_SQL)
            .bind(coupon_code)
            .fetch_all(self.db.pool())
            .await?;

        Ok(coupons)
    }

    async fn query_flat_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<FlatDiscountRecord>, StoreError> {
        let discounts = query_as::<Postgres, FlatDiscountRecord>(FIND_FLAT_DISCOUNTS_SQL)
            .bind(coupon.into_uuid())
            .fetch_all(self.db.pool())
            .await?;

        Ok(discounts)
    }

    async fn query_percent_discounts(
        &self,
        coupon: CouponUuid,
    ) -> Result<Vec<PercentDiscountRecord>, StoreError> {
        let discounts = query_as::<Postgres, PercentDiscountRecord>(FIND_PERCENT_DISCOUNTS_SQL)
            .bind(coupon.into_uuid())
            .fetch_all(self.db.pool())
            .await?;

        Ok(discounts)
    }
}

async fn insert_coupon(
    tx: &mut Transaction<'_, Postgres>,
    coupon: &CouponRecord,
) -> Result<(), sqlx::Error> {
    query(CREATE_COUPON_SQL)
        .bind(coupon.uuid.into_uuid())
        .bind(coupon.discount_type.to_str())
        .bind(coupon.coupon_code.as_str())
        .bind(try_i64_from_u64(coupon.minimum_amount, COLUMN_MINIMUM_AMOUNT)?)
        .bind(SqlxTimestamp::from(coupon.start_date))
        .bind(SqlxTimestamp::from(coupon.end_date))
        .bind(SqlxTimestamp::from(coupon.created_at))
        .bind(SqlxTimestamp::from(coupon.updated_at))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn insert_flat_discount(
    tx: &mut Transaction<'_, Postgres>,
    discount: &FlatDiscountRecord,
) -> Result<(), sqlx::Error> {
    query(CREATE_FLAT_DISCOUNT_SQL)
        .bind(discount.coupon_uuid.into_uuid())
        .bind(discount.discount_id.as_str())
        .bind(try_i64_from_u64(
            discount.discount_amount,
            COLUMN_DISCOUNT_AMOUNT,
        )?)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn insert_percent_discount(
    tx: &mut Transaction<'_, Postgres>,
    discount: &PercentDiscountRecord,
) -> Result<(), sqlx::Error> {
    query(CREATE_PERCENT_DISCOUNT_SQL)
        .bind(discount.coupon_uuid.into_uuid())
        .bind(discount.discount_id.as_str())
        .bind(i16::from(discount.discount_percentage))
        .bind(try_i64_from_u64(
            discount.maximum_amount,
            COLUMN_MAXIMUM_AMOUNT,
        )?)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn try_i64_from_u64(value: u64, column: &'static str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn try_u64_column(row: &PgRow, column: &'static str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        let discount_type = DiscountType::from_str_opt(&discount_type).ok_or_else(|| {
            sqlx::Error::ColumnDecode {
                index: "discount_type".to_string(),
                source: format!("unknown discount type {discount_type:?}").into(),
            }
        })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            discount_type,
            coupon_code: row.try_get("coupon_code")?,
            minimum_amount: try_u64_column(row, COLUMN_MINIMUM_AMOUNT)?,
            start_date: row.try_get::<SqlxTimestamp, _>("start_date")?.to_jiff(),
            end_date: row.try_get::<SqlxTimestamp, _>("end_date")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for FlatDiscountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            coupon_uuid: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
            discount_id: DiscountId::from_string(row.try_get("discount_id")?),
            discount_amount: try_u64_column(row, COLUMN_DISCOUNT_AMOUNT)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PercentDiscountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let percentage: i16 = row.try_get(COLUMN_DISCOUNT_PERCENTAGE)?;

        let discount_percentage =
            u8::try_from(percentage).map_err(|e| sqlx::Error::ColumnDecode {
                index: COLUMN_DISCOUNT_PERCENTAGE.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            coupon_uuid: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
            discount_id: DiscountId::from_string(row.try_get("discount_id")?),
            discount_percentage,
            maximum_amount: try_u64_column(row, COLUMN_MAXIMUM_AMOUNT)?,
        })
    }
}
