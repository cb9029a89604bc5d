//! Stock ledger models.

use serde::{Deserialize, Serialize};

/// Identifies one saleable unit: a product, optionally narrowed to a
/// variant. Two units with the same product id but different variant ids
/// are independent ledger rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey {
    pub product_id: i64,
    pub variant_id: Option<i64>,
}

impl UnitKey {
    pub fn product(product_id: i64) -> Self {
        Self {
            product_id,
            variant_id: None,
        }
    }

    pub fn variant(product_id: i64, variant_id: i64) -> Self {
        Self {
            product_id,
            variant_id: Some(variant_id),
        }
    }
}

/// One row of the stock ledger. `total_stock` is the permanent quantity;
/// reservations never touch it. Invariant: `total_stock >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockUnit {
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub total_stock: i64,
    pub updated_at: i64,
}


/// Audit trail entry written on every ledger mutation. The admin inventory
/// log reads these verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: i64,
    pub product_id: i64,
    pub variant_id: Option<i64>,
    pub old_value: i64,
    pub new_value: i64,
    pub delta: i64,
    /// Who caused the mutation: an admin name or a system actor such as
    /// "checkout".
    pub actor: String,
    pub reason: String,
    pub created_at: i64,
}
