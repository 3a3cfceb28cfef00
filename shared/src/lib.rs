//! Shared types and models for the E-Commerce Admin Platform
//!
//! This crate contains the catalog stock domain shared between the backend,
//! the dashboard frontend (via WASM), and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
