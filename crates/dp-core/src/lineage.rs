//! Lineage Tracking
//!
//! Keeps one [`Lineage`] record per entity and derives every backend name
//! from the tracked generation. Names are never derived by rewriting a
//! previous name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, LineageResult};
use crate::name::{EntityId, VersionedName};

/// The version history of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Base name chosen at creation
    pub base: EntityId,
    /// Number of transforms applied so far
    pub generation: u32,
    /// Whether the entity was deleted or absorbed by a merge
    pub deleted: bool,
}

impl Lineage {
    /// Create a fresh lineage at generation 0
    pub fn new(base: EntityId) -> Self {
        Self {
            base,
            generation: 0,
            deleted: false,
        }
    }

    /// Name of the current generation
    pub fn current_name(&self) -> VersionedName {
        VersionedName::new(self.base.clone(), self.generation)
    }

    /// Name the next transform will produce
    pub fn next_name(&self) -> VersionedName {
        VersionedName::new(self.base.clone(), self.generation + 1)
    }

    /// Name of the generation before the current one
    pub fn previous_name(&self) -> Option<VersionedName> {
        self.generation
            .checked_sub(1)
            .map(|generation| VersionedName::new(self.base.clone(), generation))
    }
}

/// Outcome of asking for a new generation of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Mutation {
    /// A new generation was issued under this name
    Mutated(VersionedName),
    /// The entity is deleted; nothing was issued
    SkippedDeleted,
}

impl Mutation {
    /// Get the issued name, if any
    pub fn name(&self) -> Option<&VersionedName> {
        match self {
            Mutation::Mutated(name) => Some(name),
            Mutation::SkippedDeleted => None,
        }
    }

    /// Consume the outcome, returning the issued name
    pub fn into_name(self) -> Option<VersionedName> {
        match self {
            Mutation::Mutated(name) => Some(name),
            Mutation::SkippedDeleted => None,
        }
    }

    /// Check if the entity was skipped because it is deleted
    pub fn is_skipped(&self) -> bool {
        matches!(self, Mutation::SkippedDeleted)
    }
}

/// Owns the lineage of every entity, in registration order
#[derive(Debug, Clone, Default)]
pub struct LineageTracker {
    /// Lineage records (arena)
    lineages: Vec<Lineage>,
    /// Base name to arena index
    index: HashMap<EntityId, usize>,
}

impl LineageTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of tracked entities
    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    /// Check if no entity is tracked
    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }

    /// Check if an entity is tracked
    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over all lineages in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Lineage> {
        self.lineages.iter()
    }

    /// Start tracking a new entity at generation 0
    pub fn register(&mut self, id: EntityId) -> LineageResult<VersionedName> {
        if self.index.contains_key(&id) {
            return Err(LineageError::DuplicateEntity(id));
        }
        let lineage = Lineage::new(id.clone());
        let name = lineage.current_name();
        self.index.insert(id, self.lineages.len());
        self.lineages.push(lineage);
        Ok(name)
    }

    /// Get the lineage record of an entity
    pub fn lineage(&self, id: &EntityId) -> LineageResult<&Lineage> {
        self.index
            .get(id)
            .map(|&i| &self.lineages[i])
            .ok_or_else(|| LineageError::UnknownEntity(id.clone()))
    }

    fn lineage_mut(&mut self, id: &EntityId) -> LineageResult<&mut Lineage> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.lineages[i]),
            None => Err(LineageError::UnknownEntity(id.clone())),
        }
    }

    /// Issue the next generation of an entity
    pub fn next_name(&mut self, id: &EntityId) -> LineageResult<Mutation> {
        let lineage = self.lineage_mut(id)?;
        if lineage.deleted {
            return Ok(Mutation::SkippedDeleted);
        }
        lineage.generation += 1;
        Ok(Mutation::Mutated(lineage.current_name()))
    }

    /// Name the next generation would get, without issuing it
    pub fn peek_next_name(&self, id: &EntityId) -> LineageResult<Mutation> {
        let lineage = self.lineage(id)?;
        if lineage.deleted {
            return Ok(Mutation::SkippedDeleted);
        }
        Ok(Mutation::Mutated(lineage.next_name()))
    }

    /// Name of the current generation (valid for deleted entities)
    pub fn current_name(&self, id: &EntityId) -> LineageResult<VersionedName> {
        self.lineage(id).map(Lineage::current_name)
    }

    /// Name of the generation before the current one
    pub fn previous_name(&self, id: &EntityId) -> LineageResult<VersionedName> {
        self.lineage(id)?
            .previous_name()
            .ok_or_else(|| LineageError::NoPriorVersion(id.clone()))
    }

    /// Recover the entity a backend name belongs to
    ///
    /// The name must parse and refer to a generation the entity has
    /// actually reached.
    pub fn base_of(&self, name: &str) -> LineageResult<EntityId> {
        let parsed = VersionedName::parse(name)?;
        let lineage = self
            .lineage(parsed.base())
            .map_err(|_| LineageError::malformed(name, "no such entity"))?;
        if parsed.generation() > lineage.generation {
            return Err(LineageError::malformed(
                name,
                format!(
                    "generation {} was never issued (current is {})",
                    parsed.generation(),
                    lineage.generation
                ),
            ));
        }
        Ok(lineage.base.clone())
    }

    /// Mark an entity's lineage as terminated
    ///
    /// Returns `true` if the lineage was live before this call.
    pub fn retire(&mut self, id: &EntityId) -> LineageResult<bool> {
        let lineage = self.lineage_mut(id)?;
        let was_live = !lineage.deleted;
        lineage.deleted = true;
        Ok(was_live)
    }
}
