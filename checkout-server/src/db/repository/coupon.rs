//! Coupon repository.

use shared::models::{Coupon, CouponCreate};
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};

const COUPON_SELECT: &str = "SELECT id, code, kind, value, is_active, starts_at, ends_at, max_uses, used_count, min_order_amount, max_uses_per_user, allowed_product_ids, allowed_category_ids, created_at, updated_at FROM coupon";

pub async fn create(pool: &SqlitePool, data: CouponCreate, now: i64) -> RepoResult<Coupon> {
    let id = shared::util::snowflake_id();
    let code = data.code.trim().to_lowercase();
    if code.is_empty() {
        return Err(RepoError::Validation("coupon code must not be empty".into()));
    }
    let allowed_products = serde_json::to_string(&data.allowed_product_ids.unwrap_or_default())?;
    let allowed_categories = serde_json::to_string(&data.allowed_category_ids.unwrap_or_default())?;
    sqlx::query(
        "INSERT INTO coupon (id, code, kind, value, is_active, starts_at, ends_at, max_uses, used_count, min_order_amount, max_uses_per_user, allowed_product_ids, allowed_category_ids, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(id)
    .bind(&code)
    .bind(data.kind)
    .bind(data.value)
    .bind(data.is_active.unwrap_or(true))
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(data.max_uses)
    .bind(data.min_order_amount)
    .bind(data.max_uses_per_user)
    .bind(&allowed_products)
    .bind(&allowed_categories)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_code(pool, &code)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".into()))
}

/// Case-insensitive lookup; codes are stored lowercase.
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Coupon>> {
    let sql = format!("{COUPON_SELECT} WHERE code = ?");
    let row = sqlx::query_as::<_, Coupon>(&sql)
        .bind(code.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Count of prior successful redemptions of this coupon by one user.
pub async fn user_redemption_count(
    pool: &SqlitePool,
    coupon_id: i64,
    user_id: i64,
) -> RepoResult<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM coupon_redemption WHERE coupon_id = ? AND user_id = ?",
    )
    .bind(coupon_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Guarded usage increment. Zero rows affected means the global cap was
/// reached by a concurrent redemption since validation.
pub async fn commit_use_guarded(conn: &mut SqliteConnection, coupon_id: i64, now: i64) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE coupon SET used_count = used_count + 1, updated_at = ?1 WHERE id = ?2 AND (max_uses IS NULL OR used_count < max_uses)",
    )
    .bind(now)
    .bind(coupon_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn insert_redemption(
    conn: &mut SqliteConnection,
    coupon_id: i64,
    user_id: Option<i64>,
    order_id: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO coupon_redemption (id, coupon_id, user_id, order_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(shared::util::snowflake_id())
    .bind(coupon_id)
    .bind(user_id)
    .bind(order_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
