//! Database models for the E-Commerce Admin Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
