//! Operation History
//!
//! Ordered log of every operation the modeler forwarded to the backend,
//! with the entities each one created, modified and deleted.

use dp_core::{EntityId, Plane, VersionedName};
use serde::{Deserialize, Serialize};

use crate::backend::FeatureKind;

/// Kind of client operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// A primitive was drawn
    Create(FeatureKind),
    Translate,
    Rotate,
    Fillet,
    Unite,
    Subtract,
    Delete,
    AssignPerfectE,
}

/// An entry in the operation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The operation
    pub operation: OperationKind,
    /// Plane the backend feature lives on
    pub plane: Plane,
    /// Name of the backend feature
    pub feature: String,
    /// Backend names the feature consumed
    pub inputs: Vec<VersionedName>,
    /// Entities created by this operation
    pub created: Vec<EntityId>,
    /// Entities that received a new generation
    pub modified: Vec<EntityId>,
    /// Entities deleted or absorbed by this operation
    pub deleted: Vec<EntityId>,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(operation: OperationKind, plane: Plane, feature: impl Into<String>) -> Self {
        Self {
            operation,
            plane,
            feature: feature.into(),
            inputs: Vec::new(),
            created: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Check if this entry touched an entity
    pub fn touches(&self, id: &EntityId) -> bool {
        self.created.contains(id) || self.modified.contains(id) || self.deleted.contains(id)
    }
}

/// Ordered operation log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationHistory {
    entries: Vec<HistoryEntry>,
}

impl OperationHistory {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by index
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Get the most recent entry
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Get the most recent entry mutably
    pub fn last_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.last_mut()
    }

    /// Get all entries
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Append an entry
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Iterate over the entries that touched an entity
    pub fn entries_for<'a>(&'a self, id: &'a EntityId) -> impl Iterator<Item = &'a HistoryEntry> {
        self.entries.iter().filter(move |e| e.touches(id))
    }

    /// Find the entry that deleted an entity
    pub fn deletion_of(&self, id: &EntityId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.deleted.contains(id))
    }
}
