use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
}

/// Every client-writable item column. Updates always replace all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
}

impl ItemFields {
    /// Columns an update may touch, in bind order. `id` is never writable.
    pub const COLUMNS: [&'static str; 4] = ["name", "description", "quantity", "price"];
}

impl Item {
    pub fn from_fields(id: i32, fields: ItemFields) -> Self {
        let ItemFields { name, description, quantity, price } = fields;
        Self { id, name, description, quantity, price }
    }

    /// Field-by-field replacement of every writable column.
    pub fn apply(&mut self, fields: ItemFields) {
        let ItemFields { name, description, quantity, price } = fields;
        self.name = name;
        self.description = description;
        self.quantity = quantity;
        self.price = price;
    }
}
