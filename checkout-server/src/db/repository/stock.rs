//! Stock ledger repository.

use shared::models::{StockAdjustment, StockUnit, UnitKey};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoResult, variant_column};

const UNIT_SELECT: &str = "SELECT product_id, NULLIF(variant_id, 0) AS variant_id, total_stock, updated_at FROM stock_unit";

pub async fn find(pool: &SqlitePool, unit: UnitKey) -> RepoResult<Option<StockUnit>> {
    let sql = format!("{UNIT_SELECT} WHERE product_id = ? AND variant_id = ?");
    let row = sqlx::query_as::<_, StockUnit>(&sql)
        .bind(unit.product_id)
        .bind(variant_column(unit.variant_id))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Current total inside a write transaction, for audit old/new values.
pub async fn total_for_update(
    conn: &mut SqliteConnection,
    unit: UnitKey,
) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT total_stock FROM stock_unit WHERE product_id = ? AND variant_id = ?",
    )
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(t,)| t))
}

/// Guarded in-place adjustment. Affects zero rows when the unit is missing
/// or the result would go negative; the caller distinguishes the two.
pub async fn adjust_guarded(
    conn: &mut SqliteConnection,
    unit: UnitKey,
    delta: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE stock_unit SET total_stock = total_stock + ?1, updated_at = ?2 WHERE product_id = ?3 AND variant_id = ?4 AND total_stock + ?1 >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Upsert an absolute stock level (admin bootstrap/correction path).
pub async fn upsert_total(
    conn: &mut SqliteConnection,
    unit: UnitKey,
    total_stock: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO stock_unit (product_id, variant_id, total_stock, updated_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT (product_id, variant_id) DO UPDATE SET total_stock = excluded.total_stock, updated_at = excluded.updated_at",
    )
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .bind(total_stock)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_adjustment(
    conn: &mut SqliteConnection,
    entry: &StockAdjustment,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO stock_adjustment (id, product_id, variant_id, old_value, new_value, delta, actor, reason, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(entry.id)
    .bind(entry.product_id)
    .bind(variant_column(entry.variant_id))
    .bind(entry.old_value)
    .bind(entry.new_value)
    .bind(entry.delta)
    .bind(&entry.actor)
    .bind(&entry.reason)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Audit trail for one unit, newest first.
pub async fn adjustment_log(
    pool: &SqlitePool,
    unit: UnitKey,
    limit: i64,
) -> RepoResult<Vec<StockAdjustment>> {
    let rows = sqlx::query_as::<_, StockAdjustment>(
        "SELECT id, product_id, NULLIF(variant_id, 0) AS variant_id, old_value, new_value, delta, actor, reason, created_at FROM stock_adjustment WHERE product_id = ? AND variant_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
