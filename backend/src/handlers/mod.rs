//! HTTP handlers for the E-Commerce Admin Platform

pub mod consistency;
pub mod health;
pub mod movement;
pub mod snapshot;

pub use consistency::*;
pub use health::*;
pub use movement::*;
pub use snapshot::*;
