use serde::Deserialize;
use serde_json::{json, Value};

use stockroom_core::{Confirmation, Product, UnitNouns};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Body shared by sell, reduce and lower: a product and an amount.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveProductRequest {
    pub name: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn product_to_json(product: &Product, nouns: &UnitNouns) -> Value {
    let mut body = json!({
        "name": product.name.as_str(),
        "quantity": product.quantity,
        "unit": nouns.noun_for(product.name.as_str()),
        "display": nouns.stock_line(product),
    });
    if let Some(weight) = product.weight {
        body["weight"] = json!(weight.kg());
    }
    body
}

pub fn confirmation_to_json(confirmation: &Confirmation, nouns: &UnitNouns) -> Value {
    json!({
        "product": confirmation.name().as_str(),
        "outcome": confirmation,
        "message": confirmation.render(nouns),
    })
}
