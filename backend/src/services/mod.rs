//! Business logic services for the E-Commerce Admin Platform

pub mod audit;
pub mod movement;
pub mod reconcile;
pub mod snapshot;

pub use audit::AuditService;
pub use movement::MovementService;
pub use reconcile::ReconcileService;
pub use snapshot::SnapshotService;
