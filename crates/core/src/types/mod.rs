//! Core types for the people directory.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod page;
pub mod person_type;

pub use id::*;
pub use page::{PageError, PageRequest};
pub use person_type::{PersonType, PersonTypeError};
