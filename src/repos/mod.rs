//! Repos is a module responsible for interacting with postgres db
pub mod categories;
pub mod error;
pub mod goods;
pub mod producers;
pub mod repo_factory;
pub mod types;

pub use self::categories::*;
pub use self::goods::*;
pub use self::producers::*;
pub use self::repo_factory::*;
pub use self::types::*;
