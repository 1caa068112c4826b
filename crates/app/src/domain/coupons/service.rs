//! Coupons Service

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, error, info};

use crate::domain::coupons::{
    data::{FlatCouponDraft, NewCoupon, PercentCouponDraft},
    decision::{DecisionOutcome, DiscountDecision},
    errors::{CouponsServiceError, IntegrityFault},
    issuer,
    records::{CouponRecord, DiscountRecord, DiscountType},
    store::CouponStore,
    validator,
};

/// Coupons service over an injected [`CouponStore`].
#[derive(Clone)]
pub struct StoreCouponsService {
    store: Arc<dyn CouponStore>,
}

impl StoreCouponsService {
    #[must_use]
    pub fn new(store: Arc<dyn CouponStore>) -> Self {
        Self { store }
    }

    async fn issue(
        &self,
        coupon: NewCoupon,
        point_in_time: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let issued = issuer::prepare(coupon, point_in_time)?;

        let span = Span::current();

        span.record("coupon_uuid", tracing::field::display(issued.coupon.uuid));
        span.record(
            "coupon_code",
            tracing::field::display(&issued.coupon.coupon_code),
        );

        self.store.put_items(issued.store_items()).await?;

        info!(
            coupon_uuid = %issued.coupon.uuid,
            discount_id = %issued.discount.discount_id(),
            end_date = %issued.coupon.end_date,
            "issued coupon"
        );

        Ok(issued.coupon)
    }

    async fn fetch_discount(
        &self,
        coupon: &CouponRecord,
    ) -> Result<DiscountRecord, CouponsServiceError> {
        let payload = match coupon.discount_type {
            DiscountType::Flat => {
                let rows = self.store.query_flat_discounts(coupon.uuid).await?;

                validator::single_payload(rows).map(DiscountRecord::Flat)
            }
            DiscountType::Percent => {
                let rows = self.store.query_percent_discounts(coupon.uuid).await?;

                validator::single_payload(rows).map(DiscountRecord::Percent)
            }
        };

        payload.map_err(|fault| integrity_error(coupon, fault))
    }
}

impl Debug for StoreCouponsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StoreCouponsService").finish_non_exhaustive()
    }
}

fn integrity_error(coupon: &CouponRecord, fault: IntegrityFault) -> CouponsServiceError {
    error!(
        coupon_uuid = %coupon.uuid,
        coupon_code = %coupon.coupon_code,
        discount_type = %coupon.discount_type,
        fault = %fault,
        "coupon data is inconsistent"
    );

    CouponsServiceError::Integrity {
        coupon: coupon.uuid,
        fault,
    }
}

#[async_trait]
impl CouponsService for StoreCouponsService {
    #[tracing::instrument(
        name = "coupons.service.issue_flat_coupon",
        skip(self, draft),
        fields(
            coupon_uuid = tracing::field::Empty,
            coupon_code = tracing::field::Empty
        ),
        err
    )]
    async fn issue_flat_coupon(
        &self,
        draft: FlatCouponDraft,
        point_in_time: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let coupon = NewCoupon::try_from(draft)?;

        self.issue(coupon, point_in_time).await
    }

    #[tracing::instrument(
        name = "coupons.service.issue_percent_coupon",
        skip(self, draft),
        fields(
            coupon_uuid = tracing::field::Empty,
            coupon_code = tracing::field::Empty
        ),
        err
    )]
    async fn issue_percent_coupon(
        &self,
        draft: PercentCouponDraft,
        point_in_time: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let coupon = NewCoupon::try_from(draft)?;

        self.issue(coupon, point_in_time).await
    }

    #[tracing::instrument(
        name = "coupons.service.validate_coupon",
        skip(self),
        fields(
            coupon_uuid = tracing::field::Empty,
            discount_type = tracing::field::Empty,
            outcome = tracing::field::Empty
        ),
        err
    )]
    async fn validate_coupon(
        &self,
        coupon_code: &str,
        total_amount: i64,
        point_in_time: Timestamp,
    ) -> Result<DiscountDecision, CouponsServiceError> {
        let lookup = validator::check_lookup(coupon_code, total_amount)?;

        let span = Span::current();

        let coupons = self
            .store
            .query_coupons_by_code(&lookup.coupon_code)
            .await?;

        let decision = match validator::select_coupon(coupons) {
            None => DiscountDecision::rejected(DecisionOutcome::NotFound),
            Some(coupon) => {
                span.record("coupon_uuid", tracing::field::display(coupon.uuid));
                span.record(
                    "discount_type",
                    tracing::field::display(coupon.discount_type),
                );

                match validator::rejection(&coupon, lookup.total_amount, point_in_time) {
                    Some(outcome) => DiscountDecision::rejected(outcome),
                    None => {
                        let discount = self
                            .fetch_discount(&coupon)
                            .await?
                            .to_discount()
                            .and_then(|discount| discount.amount_for(lookup.total_amount))
                            .map_err(|source| {
                                integrity_error(&coupon, IntegrityFault::Discount(source))
                            })?;

                        DiscountDecision::applied(discount)
                    }
                }
            }
        };

        span.record("outcome", tracing::field::display(decision.outcome()));

        debug!(
            outcome = %decision.outcome(),
            discount = decision.discount(),
            "validated coupon"
        );

        Ok(decision)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Validate a flat coupon draft and persist its header and payload together.
    async fn issue_flat_coupon(
        &self,
        draft: FlatCouponDraft,
        point_in_time: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Validate a percent coupon draft and persist its header and payload together.
    async fn issue_percent_coupon(
        &self,
        draft: PercentCouponDraft,
        point_in_time: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Decide whether `coupon_code` applies to a cart of `total_amount` minor units.
    ///
    /// Not found, expired and below-minimum outcomes are `Ok` decisions.
    async fn validate_coupon(
        &self,
        coupon_code: &str,
        total_amount: i64,
        point_in_time: Timestamp,
    ) -> Result<DiscountDecision, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{
        domain::coupons::{
            errors::FieldIssue,
            records::{CouponUuid, DiscountId, PercentDiscountRecord},
            store::{MockCouponStore, PgCouponStore, StoreError, StoreItem},
        },
        test::{PgTestContext, TestContext, flat_draft, percent_draft},
    };

    use super::*;

    #[tokio::test]
    async fn flat_coupon_scenario() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_flat_coupon(flat_draft("SAVE10", 50, 10, 7), now)
            .await?;

        let applied = ctx.coupons.validate_coupon("SAVE10", 60, now).await?;

        assert!(applied.is_valid());
        assert_eq!(applied.discount(), 10);
        assert_eq!(applied.outcome(), DecisionOutcome::Applied);

        let below = ctx.coupons.validate_coupon("SAVE10", 40, now).await?;

        assert!(!below.is_valid());
        assert_eq!(below.discount(), 0);
        assert_eq!(below.outcome(), DecisionOutcome::BelowMinimum);
        assert_eq!(
            below.message(),
            "Your cart value is less than minimum amount."
        );

        Ok(())
    }

    #[tokio::test]
    async fn percent_coupon_scenario() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_percent_coupon(percent_draft("PCT20", 0, 20, 15, 1), now)
            .await?;

        let capped = ctx.coupons.validate_coupon("PCT20", 100, now).await?;
        let uncapped = ctx.coupons.validate_coupon("PCT20", 50, now).await?;

        assert_eq!(capped.discount(), 15);
        assert_eq!(uncapped.discount(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn percent_boundaries() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_percent_coupon(percent_draft("NONE", 0, 0, 1_000, 5), now)
            .await?;
        ctx.coupons
            .issue_percent_coupon(percent_draft("ALL", 0, 100, 5_000, 5), now)
            .await?;

        assert_eq!(
            ctx.coupons
                .validate_coupon("NONE", 9_999, now)
                .await?
                .discount(),
            0
        );
        assert_eq!(
            ctx.coupons
                .validate_coupon("ALL", 3_000, now)
                .await?
                .discount(),
            3_000
        );
        assert_eq!(
            ctx.coupons
                .validate_coupon("ALL", 8_000, now)
                .await?
                .discount(),
            5_000
        );

        Ok(())
    }

    #[tokio::test]
    async fn percent_discount_rounds_half_away_from_zero() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_percent_coupon(percent_draft("ROUND", 0, 15, 1_000, 5), now)
            .await?;

        let decision = ctx.coupons.validate_coupon("ROUND", 1_010, now).await?;

        // 15% of 1_010 is 151.5
        assert_eq!(decision.discount(), 152);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() -> TestResult {
        let ctx = TestContext::new();

        let decision = ctx
            .coupons
            .validate_coupon("MISSING", 1_000, Timestamp::now())
            .await?;

        assert!(!decision.is_valid());
        assert_eq!(decision.discount(), 0);
        assert_eq!(decision.outcome(), DecisionOutcome::NotFound);

        Ok(())
    }

    #[tokio::test]
    async fn expiry_uses_strict_less_than() -> TestResult {
        let ctx = TestContext::new();
        let issued_at = Timestamp::now();

        let coupon = ctx
            .coupons
            .issue_flat_coupon(flat_draft("DAY", 0, 100, 1), issued_at)
            .await?;

        assert_eq!(
            coupon.end_date,
            issued_at + SignedDuration::from_hours(24)
        );

        let at_end = ctx
            .coupons
            .validate_coupon("DAY", 100, coupon.end_date)
            .await?;

        assert_eq!(at_end.outcome(), DecisionOutcome::Applied);

        let past_end = ctx
            .coupons
            .validate_coupon(
                "DAY",
                100,
                coupon.end_date + SignedDuration::from_millis(1),
            )
            .await?;

        assert_eq!(past_end.outcome(), DecisionOutcome::Expired);
        assert_eq!(past_end.discount(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn minimum_amount_boundary() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_flat_coupon(flat_draft("MIN", 5_000, 500, 3), now)
            .await?;

        let at_minimum = ctx.coupons.validate_coupon("MIN", 5_000, now).await?;
        let below_minimum = ctx.coupons.validate_coupon("MIN", 4_999, now).await?;

        assert_eq!(at_minimum.discount(), 500);
        assert_eq!(below_minimum.outcome(), DecisionOutcome::BelowMinimum);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_validation_is_identical() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        ctx.coupons
            .issue_percent_coupon(percent_draft("SAME", 100, 25, 10_000, 10), now)
            .await?;

        let first = ctx.coupons.validate_coupon("SAME", 4_321, now).await?;
        let second = ctx.coupons.validate_coupon("SAME", 4_321, now).await?;

        assert_eq!(first, second);

        Ok(())
    }

    #[tokio::test]
    async fn issued_coupon_has_matching_payload() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        let coupon = ctx
            .coupons
            .issue_percent_coupon(percent_draft(" PCT20 ", 0, 20, 15, 1), now)
            .await?;

        assert_eq!(coupon.coupon_code, "PCT20");
        assert_eq!(coupon.discount_type, DiscountType::Percent);
        assert_eq!(coupon.start_date, now);

        let payloads = ctx.store.query_percent_discounts(coupon.uuid).await?;

        assert_eq!(payloads.len(), 1);
        assert!(ctx.store.query_flat_discounts(coupon.uuid).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        let original = ctx
            .coupons
            .issue_flat_coupon(flat_draft("SAVE10", 0, 10, 7), now)
            .await?;

        let result = ctx
            .coupons
            .issue_percent_coupon(percent_draft("SAVE10", 0, 50, 1_000, 7), now)
            .await;

        assert!(matches!(result, Err(CouponsServiceError::AlreadyExists)));
        assert_eq!(
            ctx.store.query_coupons_by_code("SAVE10").await?,
            [original]
        );
        assert_eq!(
            ctx.coupons
                .validate_coupon("SAVE10", 100, now)
                .await?
                .discount(),
            10
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_store() -> TestResult {
        let mut store = MockCouponStore::new();

        store.expect_put_items().never();

        let service = StoreCouponsService::new(Arc::new(store));

        let result = service
            .issue_flat_coupon(flat_draft("BAD", -1, 10, 31), Timestamp::now())
            .await;

        let Err(CouponsServiceError::Validation(errors)) = result else {
            unreachable!("negative minimum and long validity cannot be issued");
        };

        assert_eq!(errors.issue_for("minimum_amount"), Some(FieldIssue::Negative));
        assert_eq!(
            errors.issue_for("validity"),
            Some(FieldIssue::OutOfRange { min: 0, max: 30 })
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_lookup_never_reaches_store() -> TestResult {
        let mut store = MockCouponStore::new();

        store.expect_query_coupons_by_code().never();

        let service = StoreCouponsService::new(Arc::new(store));

        let result = service.validate_coupon("", -5, Timestamp::now()).await;

        let Err(CouponsServiceError::Validation(errors)) = result else {
            unreachable!("empty code and negative total cannot be validated");
        };

        assert_eq!(errors.errors().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_persistence_error() -> TestResult {
        let mut store = MockCouponStore::new();

        store
            .expect_put_items()
            .once()
            .withf(|items| {
                matches!(
                    items.as_slice(),
                    [StoreItem::Coupon(_), StoreItem::Discount(DiscountRecord::Flat(_))]
                )
            })
            .return_once(|_| Err(StoreError::Sql(sqlx::Error::PoolTimedOut)));

        let service = StoreCouponsService::new(Arc::new(store));

        let result = service
            .issue_flat_coupon(flat_draft("SAVE10", 50, 10, 7), Timestamp::now())
            .await;

        assert!(matches!(
            result,
            Err(CouponsServiceError::Persistence(StoreError::Sql(
                sqlx::Error::PoolTimedOut
            )))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn header_without_payload_is_integrity_error() -> TestResult {
        let ctx = TestContext::new();
        let now = Timestamp::now();

        let orphan = CouponRecord {
            uuid: CouponUuid::new(),
            discount_type: DiscountType::Flat,
            coupon_code: "ORPHAN".to_string(),
            minimum_amount: 0,
            start_date: now,
            end_date: now + SignedDuration::from_hours(24),
            created_at: now,
            updated_at: now,
        };

        ctx.store
            .put_items(vec![StoreItem::Coupon(orphan.clone())])
            .await?;

        let result = ctx.coupons.validate_coupon("ORPHAN", 100, now).await;

        assert!(matches!(
            result,
            Err(CouponsServiceError::Integrity {
                coupon,
                fault: IntegrityFault::MissingPayload,
            }) if coupon == orphan.uuid
        ));

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_percentage_is_integrity_error() -> TestResult {
        let now = Timestamp::now();

        let coupon = CouponRecord {
            uuid: CouponUuid::new(),
            discount_type: DiscountType::Percent,
            coupon_code: "CORRUPT".to_string(),
            minimum_amount: 0,
            start_date: now,
            end_date: now,
            created_at: now,
            updated_at: now,
        };

        let uuid = coupon.uuid;
        let mut store = MockCouponStore::new();

        store
            .expect_query_coupons_by_code()
            .once()
            .return_once(move |_| Ok(vec![coupon]));

        store
            .expect_query_percent_discounts()
            .once()
            .withf(move |coupon| *coupon == uuid)
            .return_once(move |_| {
                Ok(vec![PercentDiscountRecord {
                    coupon_uuid: uuid,
                    discount_id: DiscountId::new(DiscountType::Percent),
                    discount_percentage: 150,
                    maximum_amount: 10,
                }])
            });

        store.expect_query_flat_discounts().never();

        let service = StoreCouponsService::new(Arc::new(store));

        let result = service.validate_coupon("CORRUPT", 100, now).await;

        assert!(matches!(
            result,
            Err(CouponsServiceError::Integrity {
                fault: IntegrityFault::Discount(_),
                ..
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_coupon_skips_payload_lookup() -> TestResult {
        let now = Timestamp::now();

        let coupon = CouponRecord {
            uuid: CouponUuid::new(),
            discount_type: DiscountType::Flat,
            coupon_code: "OLD".to_string(),
            minimum_amount: 0,
            start_date: now - SignedDuration::from_hours(48),
            end_date: now - SignedDuration::from_hours(24),
            created_at: now - SignedDuration::from_hours(48),
            updated_at: now - SignedDuration::from_hours(48),
        };

        let mut store = MockCouponStore::new();

        store
            .expect_query_coupons_by_code()
            .once()
            .return_once(move |_| Ok(vec![coupon]));

        store.expect_query_flat_discounts().never();
        store.expect_query_percent_discounts().never();

        let service = StoreCouponsService::new(Arc::new(store));

        let decision = service.validate_coupon("OLD", 100, now).await?;

        assert_eq!(decision.outcome(), DecisionOutcome::Expired);
        assert_eq!(decision.message(), "Sorry, your coupon has been expired!");

        Ok(())
    }

    #[tokio::test]
    async fn flat_coupon_scenario_in_postgres() -> TestResult {
        let ctx = PgTestContext::new().await;
        let now = Timestamp::now();

        ctx.coupons
            .issue_flat_coupon(flat_draft("SAVE10", 50, 10, 7), now)
            .await?;

        let applied = ctx.coupons.validate_coupon("SAVE10", 60, now).await?;
        let below = ctx.coupons.validate_coupon("SAVE10", 40, now).await?;
        let missing = ctx.coupons.validate_coupon("SAVE11", 60, now).await?;

        assert_eq!(applied.outcome(), DecisionOutcome::Applied);
        assert_eq!(applied.discount(), 10);
        assert_eq!(below.outcome(), DecisionOutcome::BelowMinimum);
        assert_eq!(below.discount(), 0);
        assert_eq!(missing.outcome(), DecisionOutcome::NotFound);

        Ok(())
    }

    #[tokio::test]
    async fn percent_coupon_scenario_in_postgres() -> TestResult {
        let ctx = PgTestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx
            .coupons
            .issue_percent_coupon(percent_draft("PCT20", 0, 20, 15, 1), now)
            .await?;

        assert_eq!(
            ctx.coupons
                .validate_coupon("PCT20", 100, now)
                .await?
                .discount(),
            15
        );
        assert_eq!(
            ctx.coupons
                .validate_coupon("PCT20", 50, now)
                .await?
                .discount(),
            10
        );

        let expired = ctx
            .coupons
            .validate_coupon("PCT20", 100, coupon.end_date + SignedDuration::from_secs(1))
            .await?;

        assert_eq!(expired.outcome(), DecisionOutcome::Expired);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_in_postgres_leaves_one_coupon() -> TestResult {
        let ctx = PgTestContext::new().await;
        let now = Timestamp::now();

        ctx.coupons
            .issue_flat_coupon(flat_draft("SAVE10", 0, 10, 7), now)
            .await?;

        let result = ctx
            .coupons
            .issue_percent_coupon(percent_draft("SAVE10", 0, 50, 1_000, 7), now)
            .await;

        assert!(matches!(result, Err(CouponsServiceError::AlreadyExists)));

        let coupons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(ctx.db.pool())
            .await?;
        let flat: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flat_discounts")
            .fetch_one(ctx.db.pool())
            .await?;
        let percent: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM percent_discounts")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!((coupons, flat, percent), (1, 1, 0));
        assert_eq!(
            ctx.coupons
                .validate_coupon("SAVE10", 100, now)
                .await?
                .discount(),
            10
        );

        Ok(())
    }

    #[tokio::test]
    async fn header_without_payload_in_postgres_is_integrity_error() -> TestResult {
        let ctx = PgTestContext::new().await;
        let now = Timestamp::now();

        let orphan = CouponRecord {
            uuid: CouponUuid::new(),
            discount_type: DiscountType::Percent,
            coupon_code: "ORPHAN".to_string(),
            minimum_amount: 0,
            start_date: now,
            end_date: now + SignedDuration::from_hours(24),
            created_at: now,
            updated_at: now,
        };

        PgCouponStore::new(ctx.db.db())
            .put_items(vec![StoreItem::Coupon(orphan)])
            .await?;

        let result = ctx.coupons.validate_coupon("ORPHAN", 100, now).await;

        assert!(matches!(
            result,
            Err(CouponsServiceError::Integrity {
                fault: IntegrityFault::MissingPayload,
                ..
            })
        ));

        Ok(())
    }
}
