//! Entity Lineage and Routing
//!
//! This crate provides the bookkeeping a modeler needs to drive a stateful
//! geometry backend that is never read back:
//! - Validated entity identifiers and versioned backend names
//! - Per-entity generation counters (lineage)
//! - Layer to plane routing with write-once plane membership
//! - A registry of deleted and merged-away entities

pub mod constants;
pub mod error;
pub mod layer;
pub mod lineage;
pub mod name;
pub mod registry;

// Re-exports for convenience
pub use error::{LineageError, LineageResult};
pub use layer::{Layer, LayerRouter, Plane};
pub use lineage::{Lineage, LineageTracker, Mutation};
pub use name::{EntityId, VersionedName};
pub use registry::{DeleteStatus, DeletionRecord, EntityRegistry, Merge};
