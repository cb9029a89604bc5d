//! Cart input lines.
//!
//! What the storefront sends into checkout: product identity, the category
//! it belongs to (resolved by the catalog read path), and the price the
//! customer saw. The core re-validates price-affecting inputs server-side;
//! it never trusts a client-computed discount.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub name: String,
    pub category_id: Option<i64>,
    pub unit_price: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

/// Subtotal of a whole cart.
pub fn cart_subtotal(lines: &[CartLine]) -> i64 {
    lines.iter().map(CartLine::line_total).sum()
}
