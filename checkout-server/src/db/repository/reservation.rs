//! Reservation repository.
//!
//! Readers always filter by `expires_at > now`, so an expired row is
//! invisible even before a purge physically deletes it.

use shared::models::{Reservation, UnitKey};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoResult, variant_column};

const RESERVATION_SELECT: &str = "SELECT id, batch_id, product_id, NULLIF(variant_id, 0) AS variant_id, quantity, expires_at, created_at FROM reservation";

/// Delete all reservations whose clock has passed.
pub async fn purge_expired(conn: &mut SqliteConnection, now: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM reservation WHERE expires_at <= ?")
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Reserve-if-available in a single conditional statement: the row is only
/// inserted when total stock minus active holds still covers the quantity.
/// Zero rows affected means insufficient stock (or an unknown unit — the
/// subquery yields NULL and the guard fails).
pub async fn insert_guarded(
    conn: &mut SqliteConnection,
    id: i64,
    batch_id: &str,
    unit: UnitKey,
    quantity: i64,
    expires_at: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "INSERT INTO reservation (id, batch_id, product_id, variant_id, quantity, expires_at, created_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7 \
         WHERE (SELECT total_stock FROM stock_unit WHERE product_id = ?3 AND variant_id = ?4) \
               - COALESCE((SELECT SUM(quantity) FROM reservation WHERE product_id = ?3 AND variant_id = ?4 AND expires_at > ?7), 0) \
               >= ?5",
    )
    .bind(id)
    .bind(batch_id)
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .bind(quantity)
    .bind(expires_at)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Total stock and active holds for one unit, inside a write transaction.
/// `None` when the ledger has no row for the unit.
pub async fn availability(
    conn: &mut SqliteConnection,
    unit: UnitKey,
    now: i64,
) -> RepoResult<Option<(i64, i64)>> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT su.total_stock, COALESCE((SELECT SUM(r.quantity) FROM reservation r WHERE r.product_id = su.product_id AND r.variant_id = su.variant_id AND r.expires_at > ?1), 0) \
         FROM stock_unit su WHERE su.product_id = ?2 AND su.variant_id = ?3",
    )
    .bind(now)
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub async fn find_batch(pool: &SqlitePool, batch_id: &str, now: i64) -> RepoResult<Vec<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE batch_id = ? AND expires_at > ? ORDER BY id");
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(batch_id)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active holds on one unit, oldest expiry first, as `(id, quantity)`.
pub async fn active_for_unit(
    conn: &mut SqliteConnection,
    unit: UnitKey,
    now: i64,
) -> RepoResult<Vec<(i64, i64)>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT id, quantity FROM reservation \
         WHERE product_id = ?1 AND variant_id = ?2 AND expires_at > ?3 \
         ORDER BY expires_at, id",
    )
    .bind(unit.product_id)
    .bind(variant_column(unit.variant_id))
    .bind(now)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM reservation WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_batch(conn: &mut SqliteConnection, batch_id: &str) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM reservation WHERE batch_id = ?")
        .bind(batch_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Push a live batch's expiry out. Expired batches are not revived.
pub async fn extend_batch(
    conn: &mut SqliteConnection,
    batch_id: &str,
    new_expires_at: i64,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE reservation SET expires_at = ?1 WHERE batch_id = ?2 AND expires_at > ?3",
    )
    .bind(new_expires_at)
    .bind(batch_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
