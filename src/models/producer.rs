//! Producers of goods
use validator::Validate;

use schema::producers;

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "producers"]
pub struct Producer {
    pub id: i32,
    pub name: String,
}

/// Payload for creating producers
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug, PartialEq)]
#[table_name = "producers"]
pub struct NewProducer {
    #[validate(length(min = "1"))]
    pub name: String,
}

/// Payload for updating producers
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct UpdateProducer {
    #[validate(length(min = "1"))]
    pub name: String,
}
