//! Configuration validation
//!
//! Rejects unusable experiments before any data is loaded or epoch runs.

mod error;
mod validator;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::{validate_class_counts, validate_config};
