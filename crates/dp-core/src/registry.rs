//! Entity Registry
//!
//! Records which entities are deleted, either removed outright or absorbed
//! into a survivor by a union or subtraction. `Deleted` is terminal: no
//! operation brings an entity back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, LineageResult};
use crate::name::EntityId;

/// Outcome of a deletion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteStatus {
    /// The entity was active and is now deleted
    Deleted,
    /// The entity was already deleted; nothing changed
    AlreadyDeleted,
}

/// Audit record of one deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
    /// The deleted entity
    pub id: EntityId,
    /// Survivor that absorbed it (None for an explicit delete)
    pub absorbed_by: Option<EntityId>,
}

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    /// Entity whose lineage continues
    pub survivor: EntityId,
    /// Entities newly deleted by this merge
    pub absorbed: Vec<EntityId>,
}

/// Tracks deleted and merged-away entities
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    /// Deletion records in the order they happened
    records: Vec<DeletionRecord>,
    /// Entity to record index
    index: HashMap<EntityId, usize>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an entity is deleted
    pub fn is_deleted(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Get the deletion record of an entity
    pub fn record(&self, id: &EntityId) -> Option<&DeletionRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Get all deletion records in order
    pub fn records(&self) -> &[DeletionRecord] {
        &self.records
    }

    /// Iterate over the entities a survivor absorbed
    pub fn absorbed_into<'a>(
        &'a self,
        survivor: &'a EntityId,
    ) -> impl Iterator<Item = &'a EntityId> {
        self.records
            .iter()
            .filter(move |r| r.absorbed_by.as_ref() == Some(survivor))
            .map(|r| &r.id)
    }

    /// Delete an entity outright
    ///
    /// Deleting twice is expected client behavior and reports
    /// [`DeleteStatus::AlreadyDeleted`].
    pub fn mark_deleted(&mut self, id: &EntityId) -> DeleteStatus {
        self.insert(id, None)
    }

    fn insert(&mut self, id: &EntityId, absorbed_by: Option<&EntityId>) -> DeleteStatus {
        if self.index.contains_key(id) {
            return DeleteStatus::AlreadyDeleted;
        }
        self.index.insert(id.clone(), self.records.len());
        self.records.push(DeletionRecord {
            id: id.clone(),
            absorbed_by: absorbed_by.cloned(),
        });
        DeleteStatus::Deleted
    }

    /// Merge operands into the first one
    ///
    /// The first operand survives. Unless `keep_originals` is set, every
    /// other operand is marked deleted and attributed to the survivor. The
    /// survivor's own state is left alone.
    pub fn merge(&mut self, operands: &[EntityId], keep_originals: bool) -> LineageResult<Merge> {
        let (survivor, rest) = operands
            .split_first()
            .ok_or(LineageError::EmptyOperandList)?;

        let mut absorbed = Vec::new();
        if !keep_originals {
            for id in rest.iter().filter(|id| *id != survivor) {
                if self.insert(id, Some(survivor)) == DeleteStatus::Deleted {
                    absorbed.push(id.clone());
                }
            }
        }

        Ok(Merge {
            survivor: survivor.clone(),
            absorbed,
        })
    }
}
