//! Stock Ledger: pure quantity bookkeeping plus an audit trail.
//!
//! The ledger knows nothing about reservations. Its single invariant is
//! `total_stock >= 0`, enforced by a guarded UPDATE so no read-then-write
//! window exists; a failed guard is reported as [`InventoryError::NegativeStock`]
//! and logged loudly, since it indicates bookkeeping drift somewhere
//! upstream.

use std::sync::Arc;

use shared::clock::Clock;
use shared::error::InventoryError;
use shared::models::{StockAdjustment, StockUnit, UnitKey};
use sqlx::SqlitePool;

use crate::core::CoreResult;
use crate::db::ImmediateTxn;
use crate::db::repository::stock;

#[derive(Clone)]
pub struct StockLedger {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl StockLedger {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Permanent quantity on hand, ignoring holds.
    pub async fn total_stock(&self, unit: UnitKey) -> CoreResult<i64> {
        let row = stock::find(&self.pool, unit).await?;
        row.map(|u| u.total_stock).ok_or_else(|| {
            InventoryError::UnknownUnit {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
            }
            .into()
        })
    }

    pub async fn find_unit(&self, unit: UnitKey) -> CoreResult<Option<StockUnit>> {
        Ok(stock::find(&self.pool, unit).await?)
    }

    /// Relative adjustment. Fails with `NegativeStock` when the result
    /// would go below zero; nothing is written in that case.
    pub async fn adjust_stock(
        &self,
        unit: UnitKey,
        delta: i64,
        actor: &str,
        reason: &str,
    ) -> CoreResult<i64> {
        let now = self.clock.now_millis();
        let mut txn = ImmediateTxn::begin(&self.pool).await?;

        let Some(old_value) = stock::total_for_update(txn.conn(), unit).await? else {
            txn.rollback().await?;
            return Err(InventoryError::UnknownUnit {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
            }
            .into());
        };

        let affected = stock::adjust_guarded(txn.conn(), unit, delta, now).await?;
        if affected == 0 {
            txn.rollback().await?;
            tracing::error!(
                product_id = unit.product_id,
                variant_id = ?unit.variant_id,
                current = old_value,
                delta,
                "Stock adjustment rejected: ledger would go negative"
            );
            return Err(InventoryError::NegativeStock {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
                current: old_value,
                delta,
            }
            .into());
        }

        let new_value = old_value + delta;
        self.write_audit(&mut txn, unit, old_value, new_value, actor, reason, now)
            .await?;
        txn.commit().await?;

        tracing::debug!(
            product_id = unit.product_id,
            variant_id = ?unit.variant_id,
            old_value,
            new_value,
            actor,
            "Stock adjusted"
        );
        Ok(new_value)
    }

    /// Absolute set (admin bootstrap/correction). Creates the unit row if
    /// it doesn't exist yet.
    pub async fn set_stock(
        &self,
        unit: UnitKey,
        total_stock: i64,
        actor: &str,
        reason: &str,
    ) -> CoreResult<StockUnit> {
        if total_stock < 0 {
            return Err(InventoryError::NegativeStock {
                product_id: unit.product_id,
                variant_id: unit.variant_id,
                current: 0,
                delta: total_stock,
            }
            .into());
        }
        let now = self.clock.now_millis();
        let mut txn = ImmediateTxn::begin(&self.pool).await?;

        let old_value = stock::total_for_update(txn.conn(), unit).await?.unwrap_or(0);
        stock::upsert_total(txn.conn(), unit, total_stock, now).await?;
        self.write_audit(&mut txn, unit, old_value, total_stock, actor, reason, now)
            .await?;
        txn.commit().await?;

        Ok(StockUnit {
            product_id: unit.product_id,
            variant_id: unit.variant_id,
            total_stock,
            updated_at: now,
        })
    }

    /// Audit trail for the admin inventory log, newest first.
    pub async fn adjustment_log(
        &self,
        unit: UnitKey,
        limit: i64,
    ) -> CoreResult<Vec<StockAdjustment>> {
        Ok(stock::adjustment_log(&self.pool, unit, limit).await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn write_audit(
        &self,
        txn: &mut ImmediateTxn,
        unit: UnitKey,
        old_value: i64,
        new_value: i64,
        actor: &str,
        reason: &str,
        now: i64,
    ) -> CoreResult<()> {
        let entry = StockAdjustment {
            id: shared::util::snowflake_id(),
            product_id: unit.product_id,
            variant_id: unit.variant_id,
            old_value,
            new_value,
            delta: new_value - old_value,
            actor: actor.to_string(),
            reason: reason.to_string(),
            created_at: now,
        };
        stock::insert_adjustment(txn.conn(), &entry).await?;
        Ok(())
    }
}
