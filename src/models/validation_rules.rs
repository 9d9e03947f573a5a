use std::borrow::Cow;
use std::collections::HashMap;

use validator::{ValidationError, ValidationErrors};

use super::category::{parent_or_sentinel, ROOT_PARENT_ID};

pub fn validate_non_negative<T: Into<f64>>(val: T) -> Result<(), ValidationError> {
    let val: f64 = val.into();
    if val.is_finite() && val >= 0f64 {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("value"),
            message: Some(Cow::from("Value must be a finite non negative number.")),
            params: HashMap::new(),
        })
    }
}

/// Checks parent reference of a category payload. `id` is the category
/// being updated, `None` for new categories.
pub fn validate_category_parent(id: Option<i32>, parent_id: Option<i32>) -> Result<(), ValidationErrors> {
    let parent_id = parent_or_sentinel(parent_id);
    if parent_id < ROOT_PARENT_ID {
        return Err(validation_errors!({"parent_id": ["parent_id" => "Parent id must be non negative"]}));
    }
    match id {
        Some(id) if parent_id != ROOT_PARENT_ID && parent_id == id => Err(validation_errors!({
            "parent_id": ["parent_id" => "Category can not be its own parent"]
        })),
        _ => Ok(()),
    }
}

/// Ids of entities referenced by goods must point to stored rows
pub fn validate_reference_id(id: i32) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("id"),
            message: Some(Cow::from("Id must be positive.")),
            params: HashMap::new(),
        })
    }
}
