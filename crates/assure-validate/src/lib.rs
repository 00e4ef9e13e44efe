pub mod accessor;
pub mod engine;
pub mod error;

pub use accessor::ColumnAccessor;
pub use engine::{evaluate, validate, validate_source};
pub use error::ComputeError;
