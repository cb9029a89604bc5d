//! Return request repository.

use shared::models::{ReturnItem, ReturnRequest, ReturnStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

const RETURN_SELECT: &str = "SELECT id, order_id, items, reason, status, refund_amount, requested_at, decision_at FROM return_request";

pub async fn insert(
    conn: &mut SqliteConnection,
    id: i64,
    order_id: i64,
    items: &[ReturnItem],
    reason: &str,
    now: i64,
) -> RepoResult<()> {
    let items = serde_json::to_string(items)?;
    sqlx::query(
        "INSERT INTO return_request (id, order_id, items, reason, status, refund_amount, requested_at, decision_at) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, NULL)",
    )
    .bind(id)
    .bind(order_id)
    .bind(&items)
    .bind(reason)
    .bind(ReturnStatus::Requested)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReturnRequest>> {
    let sql = format!("{RETURN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ReturnRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<ReturnRequest>> {
    let sql = format!("{RETURN_SELECT} WHERE order_id = ? ORDER BY requested_at DESC, id DESC");
    let rows = sqlx::query_as::<_, ReturnRequest>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Move a return request along its machine, guarded by the expected
/// current status so concurrent decisions cannot both land.
pub async fn update_status_guarded(
    conn: &mut SqliteConnection,
    id: i64,
    from: ReturnStatus,
    to: ReturnStatus,
    refund_amount: Option<i64>,
    decision_at: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE return_request SET status = ?1, refund_amount = COALESCE(?2, refund_amount), decision_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(to)
    .bind(refund_amount)
    .bind(decision_at)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
