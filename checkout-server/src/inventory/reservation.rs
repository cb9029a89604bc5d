//! Reservation Manager: time-boxed holds during checkout.
//!
//! Reserving is all-or-nothing: the whole batch happens inside one write
//! transaction, and each line is a single conditional INSERT that only
//! lands while `total - Σ active holds` still covers it. The first short
//! line rolls the entire batch back, so partial holds never exist.
//!
//! Expiry is time-driven. Every read path filters `expires_at > now` and
//! purges dead rows first (lazy purge); the periodic sweep in
//! `core::tasks` only keeps the table small.

use std::sync::Arc;

use shared::clock::Clock;
use shared::error::InventoryError;
use shared::models::{Reservation, ReservationBatch, ReservationLine, UnitKey};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::CoreResult;
use crate::db::ImmediateTxn;
use crate::db::repository::reservation as repo;

#[derive(Clone)]
pub struct ReservationManager {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl ReservationManager {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Hold `lines` for `ttl_millis`. Zero-quantity lines are skipped (a
    /// no-op, not an error); any line that cannot be covered fails the
    /// whole batch with `InsufficientStock` and leaves no holds behind.
    pub async fn reserve(
        &self,
        lines: &[ReservationLine],
        ttl_millis: i64,
    ) -> CoreResult<ReservationBatch> {
        let now = self.clock.now_millis();
        let expires_at = now + ttl_millis;
        let batch_id = Uuid::new_v4().to_string();

        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        repo::purge_expired(txn.conn(), now).await?;

        let mut reservation_ids = Vec::with_capacity(lines.len());
        for line in lines {
            debug_assert!(line.quantity >= 0, "negative quantities are rejected upstream");
            if line.quantity == 0 {
                continue;
            }
            let unit = UnitKey {
                product_id: line.product_id,
                variant_id: line.variant_id,
            };
            let id = shared::util::snowflake_id();
            let affected = repo::insert_guarded(
                txn.conn(),
                id,
                &batch_id,
                unit,
                line.quantity,
                expires_at,
                now,
            )
            .await?;

            if affected == 0 {
                // Re-read inside the transaction so the error carries the
                // numbers the guard actually saw.
                let availability = repo::availability(txn.conn(), unit, now).await?;
                txn.rollback().await?;
                let err = match availability {
                    Some((total, reserved)) => InventoryError::InsufficientStock {
                        product_id: unit.product_id,
                        variant_id: unit.variant_id,
                        requested: line.quantity,
                        available: total - reserved,
                    },
                    None => InventoryError::UnknownUnit {
                        product_id: unit.product_id,
                        variant_id: unit.variant_id,
                    },
                };
                tracing::info!(
                    product_id = unit.product_id,
                    variant_id = ?unit.variant_id,
                    requested = line.quantity,
                    "Reservation batch rejected"
                );
                return Err(err.into());
            }
            reservation_ids.push(id);
        }

        txn.commit().await?;
        tracing::debug!(
            batch_id = %batch_id,
            holds = reservation_ids.len(),
            expires_at,
            "Reservation batch created"
        );
        Ok(ReservationBatch {
            batch_id,
            reservation_ids,
            expires_at,
        })
    }

    /// Drop every hold in a batch (checkout abandonment, order
    /// cancellation, or commit). Releasing an already-expired or unknown
    /// batch is harmless; the count released is returned for logging.
    pub async fn release_batch(&self, batch_id: &str) -> CoreResult<u64> {
        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        let released = repo::delete_batch(txn.conn(), batch_id).await?;
        txn.commit().await?;
        if released > 0 {
            tracing::debug!(batch_id = %batch_id, released, "Reservation batch released");
        }
        Ok(released)
    }

    /// Release active holds matching `lines` when the caller no longer has
    /// the batch handle (abandoned checkout UI, cancellation cleanup).
    /// Holds are dropped oldest-expiry-first until each line's quantity is
    /// covered; whole holds only, so slightly more than asked may be
    /// freed. Returns the number of holds deleted.
    pub async fn release(&self, lines: &[ReservationLine]) -> CoreResult<u64> {
        let now = self.clock.now_millis();
        let mut txn = ImmediateTxn::begin(&self.pool).await?;

        let mut released = 0u64;
        for line in lines {
            if line.quantity <= 0 {
                continue;
            }
            let unit = UnitKey {
                product_id: line.product_id,
                variant_id: line.variant_id,
            };
            let mut remaining = line.quantity;
            for (id, quantity) in repo::active_for_unit(txn.conn(), unit, now).await? {
                if remaining <= 0 {
                    break;
                }
                released += repo::delete_by_id(txn.conn(), id).await?;
                remaining -= quantity;
            }
        }

        txn.commit().await?;
        if released > 0 {
            tracing::debug!(released, "Reservations released by unit");
        }
        Ok(released)
    }

    /// Push a live batch's expiry to `now + ttl_millis`. A payment retry
    /// extends its existing holds instead of stacking a second batch on
    /// the same stock.
    pub async fn extend_batch(
        &self,
        batch_id: &str,
        ttl_millis: i64,
    ) -> CoreResult<ReservationBatch> {
        let now = self.clock.now_millis();
        let expires_at = now + ttl_millis;

        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        let affected = repo::extend_batch(txn.conn(), batch_id, expires_at, now).await?;
        if affected == 0 {
            txn.rollback().await?;
            return Err(InventoryError::BatchNotFound(batch_id.to_string()).into());
        }
        txn.commit().await?;

        let holds = repo::find_batch(&self.pool, batch_id, now).await?;
        Ok(ReservationBatch {
            batch_id: batch_id.to_string(),
            reservation_ids: holds.iter().map(|r| r.id).collect(),
            expires_at,
        })
    }

    /// Available-to-sell: total stock minus active holds. Purges expired
    /// rows first; the filter by `expires_at` makes even unpurged dead
    /// rows invisible.
    pub async fn available_stock(&self, unit: UnitKey) -> CoreResult<i64> {
        let now = self.clock.now_millis();
        self.purge_expired().await?;

        let mut conn = self.pool.acquire().await.map_err(crate::db::repository::RepoError::from)?;
        let availability = repo::availability(&mut conn, unit, now).await?;
        match availability {
            Some((total, reserved)) => Ok(total - reserved),
            None => Err(InventoryError::UnknownUnit {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
            }
            .into()),
        }
    }

    /// Active holds in a batch (diagnostics and the extend path).
    pub async fn find_batch(&self, batch_id: &str) -> CoreResult<Vec<Reservation>> {
        let now = self.clock.now_millis();
        Ok(repo::find_batch(&self.pool, batch_id, now).await?)
    }

    /// Delete all expired holds. Called lazily before reads and by the
    /// periodic sweep.
    pub async fn purge_expired(&self) -> CoreResult<u64> {
        let now = self.clock.now_millis();
        let mut txn = ImmediateTxn::begin(&self.pool).await?;
        let purged = repo::purge_expired(txn.conn(), now).await?;
        txn.commit().await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired reservations purged");
        }
        Ok(purged)
    }
}
