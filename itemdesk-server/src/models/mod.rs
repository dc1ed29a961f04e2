//! Domain models with validation at construction
//!
//! Submitted form values are validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod item;
pub mod validation;

pub use item::{Item, ItemName};
pub use validation::ValidationError;
