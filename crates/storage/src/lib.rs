pub mod backend;
pub mod error;
mod key;
mod value;

pub use crate::backend::KeyValueStore;
pub use crate::key::validate as validate_key;
pub use crate::value::Value;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn KeyValueStore>;
