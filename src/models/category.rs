//! Categories of goods. Categories form a tree with a single root
//! (level 0, no parent) and at most `MAX_LEVEL` levels below it.
use validator::Validate;

use schema::categories;

/// Level of the root category
pub const ROOT_LEVEL: i16 = 0;
/// Level of subcategories
pub const SUB_CATEGORY_LEVEL: i16 = 2;
/// Deepest level of the tree
pub const MAX_LEVEL: i16 = 5;
/// Parent id used by clients for "no parent"
pub const ROOT_PARENT_ID: i32 = 0;

/// Category as it is stored in PG, `parent_id` is `None` only for the root
#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "categories"]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub level: i16,
    pub parent_id: Option<i32>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Payload for creating categories
#[derive(Serialize, Deserialize, Insertable, Clone, Validate, Debug, PartialEq)]
#[table_name = "categories"]
pub struct NewCategory {
    #[validate(length(min = "1"))]
    pub name: String,
    #[validate(range(min = "0", max = "5"))]
    #[serde(default)]
    pub level: i16,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

impl NewCategory {
    /// Payload asks for a category without parent
    pub fn has_no_parent(&self) -> bool {
        parent_or_sentinel(self.parent_id) == ROOT_PARENT_ID
    }
}

/// Payload for updating categories
#[derive(Serialize, Deserialize, Clone, Validate, Debug, PartialEq)]
pub struct UpdateCategory {
    #[validate(length(min = "1"))]
    pub name: String,
    #[validate(range(min = "0", max = "5"))]
    #[serde(default)]
    pub level: i16,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

impl UpdateCategory {
    pub fn has_no_parent(&self) -> bool {
        parent_or_sentinel(self.parent_id) == ROOT_PARENT_ID
    }
}

/// Clients send either `null` or `0` for "no parent"
pub fn parent_or_sentinel(parent_id: Option<i32>) -> i32 {
    parent_id.unwrap_or(ROOT_PARENT_ID)
}
