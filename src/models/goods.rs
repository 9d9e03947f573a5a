//! Goods offered in the catalog
use validator::Validate;

use models::validation_rules::*;
use schema::goods;

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "goods"]
pub struct Goods {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub in_stock: bool,
    pub category_id: i32,
    pub producer_id: i32,
}

/// Payload for creating goods
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug, PartialEq)]
#[table_name = "goods"]
pub struct NewGoods {
    #[validate(length(min = "1"))]
    pub name: String,
    #[validate(custom = "validate_non_negative")]
    pub price: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[validate(custom = "validate_reference_id")]
    pub category_id: i32,
    #[validate(custom = "validate_reference_id")]
    pub producer_id: i32,
}

/// Payload for updating goods, every field is written
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct UpdateGoods {
    #[validate(length(min = "1"))]
    pub name: String,
    #[validate(custom = "validate_non_negative")]
    pub price: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[validate(custom = "validate_reference_id")]
    pub category_id: i32,
    #[validate(custom = "validate_reference_id")]
    pub producer_id: i32,
}

/// Search options for goods. Zero ids mean "any", zero price bounds mean
/// "no price restriction".
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GoodsFilter {
    pub min_price: f64,
    pub max_price: f64,
    pub category_id: i32,
    pub producer_id: i32,
    pub in_stock: bool,
}

impl Default for GoodsFilter {
    fn default() -> Self {
        Self {
            min_price: 0.0,
            max_price: 0.0,
            category_id: 0,
            producer_id: 0,
            in_stock: true,
        }
    }
}

impl GoodsFilter {
    pub fn category(&self) -> Option<i32> {
        if self.category_id != 0 {
            Some(self.category_id)
        } else {
            None
        }
    }

    pub fn producer(&self) -> Option<i32> {
        if self.producer_id != 0 {
            Some(self.producer_id)
        } else {
            None
        }
    }

    /// Inclusive price bounds, applied only when at least one bound is set
    /// and the bounds are ordered
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if (self.min_price != 0.0 || self.max_price != 0.0) && self.min_price <= self.max_price {
            Some((self.min_price, self.max_price))
        } else {
            None
        }
    }
}
