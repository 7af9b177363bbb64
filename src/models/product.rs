use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Unit price in cents
    pub price: u64,
    pub stock: u32,
}

pub fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Laptop".to_string(),
            price: 599_900,
            stock: 10,
        },
        Product {
            id: 2,
            name: "Wireless Mouse".to_string(),
            price: 19_900,
            stock: 0,
        },
    ]
}

/// A completed purchase
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_amount: u64,
    pub purchased_at: DateTime<Utc>,
}
