//! People Core - Shared types library.
//!
//! This crate provides common types used across the people directory:
//! - `api` - JSON API server for browsing and editing people
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, person types and validated pagination
//! - [`reconcile`] - Keyed diff of a stored child collection against a desired one

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reconcile;
pub mod types;

pub use types::*;
