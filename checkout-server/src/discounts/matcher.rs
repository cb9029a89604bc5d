//! Coupon eligibility predicates.
//!
//! Pure functions over a coupon and cart lines; all time comes in as an
//! argument so callers decide whose clock applies.

use shared::error::CouponError;
use shared::models::{CartLine, Coupon};

/// Check the activity window. Unset bounds are open.
pub fn check_window(coupon: &Coupon, now: i64) -> Result<(), CouponError> {
    if let Some(starts_at) = coupon.starts_at
        && now < starts_at
    {
        return Err(CouponError::NotYetActive);
    }
    if let Some(ends_at) = coupon.ends_at
        && now > ends_at
    {
        return Err(CouponError::Expired);
    }
    Ok(())
}

/// Whether one cart line falls inside the coupon's allow-lists. An
/// unrestricted coupon matches everything.
pub fn line_matches(coupon: &Coupon, line: &CartLine) -> bool {
    if !coupon.is_restricted() {
        return true;
    }
    if coupon.allowed_product_ids.contains(&line.product_id) {
        return true;
    }
    match line.category_id {
        Some(category_id) => coupon.allowed_category_ids.contains(&category_id),
        None => false,
    }
}

/// The portion of the cart a restricted coupon may discount: the sum of
/// matching line totals only. A coupon restricted to category X must not
/// discount items outside X.
pub fn eligible_line_total(coupon: &Coupon, lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .filter(|line| line_matches(coupon, line))
        .map(CartLine::line_total)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CouponKind;

    fn make_coupon() -> Coupon {
        Coupon {
            id: 1,
            code: "test".to_string(),
            kind: CouponKind::Percent,
            value: 20,
            is_active: true,
            starts_at: None,
            ends_at: None,
            max_uses: None,
            used_count: 0,
            min_order_amount: None,
            max_uses_per_user: None,
            allowed_product_ids: vec![],
            allowed_category_ids: vec![],
            created_at: 0,
            updated_at: 0,
        }
    }

    fn line(product_id: i64, category_id: Option<i64>, unit_price: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            variant_id: None,
            name: format!("Product {product_id}"),
            category_id,
            unit_price,
            quantity,
        }
    }

    #[test]
    fn test_open_window_always_valid() {
        let coupon = make_coupon();
        assert!(check_window(&coupon, 0).is_ok());
        assert!(check_window(&coupon, i64::MAX).is_ok());
    }

    #[test]
    fn test_window_bounds() {
        let mut coupon = make_coupon();
        coupon.starts_at = Some(1_000);
        coupon.ends_at = Some(2_000);

        assert_eq!(check_window(&coupon, 999), Err(CouponError::NotYetActive));
        assert!(check_window(&coupon, 1_000).is_ok());
        assert!(check_window(&coupon, 2_000).is_ok());
        assert_eq!(check_window(&coupon, 2_001), Err(CouponError::Expired));
    }

    #[test]
    fn test_unrestricted_matches_all() {
        let coupon = make_coupon();
        assert!(line_matches(&coupon, &line(1, None, 100, 1)));
        assert!(line_matches(&coupon, &line(99, Some(7), 100, 1)));
    }

    #[test]
    fn test_product_allow_list() {
        let mut coupon = make_coupon();
        coupon.allowed_product_ids = vec![1, 2];

        assert!(line_matches(&coupon, &line(1, None, 100, 1)));
        assert!(!line_matches(&coupon, &line(3, None, 100, 1)));
    }

    #[test]
    fn test_category_allow_list() {
        let mut coupon = make_coupon();
        coupon.allowed_category_ids = vec![10];

        assert!(line_matches(&coupon, &line(1, Some(10), 100, 1)));
        assert!(!line_matches(&coupon, &line(1, Some(11), 100, 1)));
        // A line without a category can't match a category restriction
        assert!(!line_matches(&coupon, &line(1, None, 100, 1)));
    }

    #[test]
    fn test_eligible_total_restricted_to_category() {
        let mut coupon = make_coupon();
        coupon.allowed_category_ids = vec![1];

        // 100,000 in category 1, 50,000 in category 2
        let lines = vec![line(1, Some(1), 50_000, 2), line(2, Some(2), 50_000, 1)];
        assert_eq!(eligible_line_total(&coupon, &lines), 100_000);
    }

    #[test]
    fn test_eligible_total_unrestricted_is_whole_cart() {
        let coupon = make_coupon();
        let lines = vec![line(1, Some(1), 50_000, 2), line(2, Some(2), 50_000, 1)];
        assert_eq!(eligible_line_total(&coupon, &lines), 150_000);
    }
}
