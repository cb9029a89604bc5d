//! Order repository.

use shared::models::{Order, OrderStatus, PaymentState};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

const ORDER_SELECT: &str = "SELECT id, user_id, items, subtotal, discount, shipping_cost, total, status, address_id, coupon_code, tracking_number, estimated_delivery, payment_token, payment_state, reservation_batch, created_at, updated_at FROM orders";

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    let items = serde_json::to_string(&order.items)?;
    sqlx::query(
        "INSERT INTO orders (id, user_id, items, subtotal, discount, shipping_cost, total, status, address_id, coupon_code, tracking_number, estimated_delivery, payment_token, payment_state, reservation_batch, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&items)
    .bind(order.subtotal)
    .bind(order.discount)
    .bind(order.shipping_cost)
    .bind(order.total)
    .bind(order.status)
    .bind(order.address_id)
    .bind(&order.coupon_code)
    .bind(&order.tracking_number)
    .bind(order.estimated_delivery)
    .bind(&order.payment_token)
    .bind(order.payment_state)
    .bind(&order.reservation_batch)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let rows = match status {
        Some(status) => {
            let sql = format!("{ORDER_SELECT} WHERE status = ? ORDER BY created_at DESC LIMIT ?");
            sqlx::query_as::<_, Order>(&sql)
                .bind(status)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{ORDER_SELECT} ORDER BY created_at DESC LIMIT ?");
            sqlx::query_as::<_, Order>(&sql)
                .bind(limit)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    tracking_number: Option<&str>,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?1, tracking_number = COALESCE(?2, tracking_number), updated_at = ?3 WHERE id = ?4",
    )
    .bind(status)
    .bind(tracking_number)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Status change guarded by the status the caller decided against; zero
/// rows means the order moved underneath the decision.
pub async fn update_status_guarded(
    conn: &mut SqliteConnection,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_tracking(
    conn: &mut SqliteConnection,
    id: i64,
    tracking_number: &str,
    now: i64,
) -> RepoResult<u64> {
    let result =
        sqlx::query("UPDATE orders SET tracking_number = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(tracking_number)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

pub async fn set_estimated_delivery(
    conn: &mut SqliteConnection,
    id: i64,
    estimated_delivery: i64,
    now: i64,
) -> RepoResult<u64> {
    let result =
        sqlx::query("UPDATE orders SET estimated_delivery = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(estimated_delivery)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

/// Idempotency guard for payment callbacks: only a pending order moves.
/// Zero rows affected means the callback is a duplicate (or the order is
/// unknown — the caller checks existence first).
pub async fn set_payment_state_guarded(
    conn: &mut SqliteConnection,
    id: i64,
    to: PaymentState,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET payment_state = ?1, updated_at = ?2 WHERE id = ?3 AND payment_state = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(PaymentState::Pending)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Hard delete; return requests cascade via foreign key.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
