// Listing enricher - popularity rows with quantity per order
use super::snapshot::ListingRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityEntry {
    pub name: String,
    pub image_ref: String,
    pub quantity: f64,
    pub orders: u64,
    /// `None` when the row has no orders
    pub quantity_per_order: Option<f64>,
}

impl PopularityEntry {
    pub fn from_row(row: &ListingRow) -> Self {
        let quantity_per_order = (row.orders > 0).then(|| row.quantity / row.orders as f64);

        Self {
            name: row.name.clone(),
            image_ref: row.image_ref.clone(),
            quantity: row.quantity,
            orders: row.orders,
            quantity_per_order,
        }
    }
}

/// Enrich ranked rows, keeping the service's ranking.
pub fn enrich(rows: &[ListingRow]) -> Vec<PopularityEntry> {
    rows.iter().map(PopularityEntry::from_row).collect()
}
