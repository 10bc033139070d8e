//! People directory API library.
//!
//! Exposes the repository, models and router so the CLI and the integration
//! tests can drive the same code paths as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
