//! Models contains all structures that are used in different
//! modules of the app

pub mod category;
pub mod goods;
pub mod ordering;
pub mod producer;
pub mod validation_rules;

pub use self::category::*;
pub use self::goods::*;
pub use self::ordering::*;
pub use self::producer::*;
pub use self::validation_rules::*;
