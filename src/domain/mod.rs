//! # Domain Layer
//!
//! Value objects, entities, errors and the pure settlement engine. Nothing
//! in this layer performs I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
