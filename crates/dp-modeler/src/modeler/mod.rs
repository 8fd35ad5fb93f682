//! Drawing Operations
//!
//! [`Modeler`] is the facade clients draw through. Every operation resolves
//! the entity's plane and versioned names from the lineage bookkeeping and
//! forwards the concrete feature to the backend.
//!
//! A feature name is used up as soon as the backend created the feature:
//! the new generation and its history entry are committed right away, even
//! if wiring the feature's selections fails afterwards. A failed creation
//! commits nothing. Nothing already sent to the backend is rolled back, so
//! after an error the bookkeeping and the history describe exactly the
//! features the backend holds.

mod boolean;
mod draw;
mod sweep;
mod transform;

use dp_core::{
    EntityId, EntityRegistry, LayerRouter, LineageError, LineageTracker, Mutation, Plane,
    VersionedName,
};
use thiserror::Error;

use crate::backend::{BackendError, GeometryBackend};
use crate::expr::{BracketUnits, ExpressionTranslator};
use crate::history::{HistoryEntry, OperationHistory};
use crate::options::ModelerOptions;

/// Modeler errors
#[derive(Debug, Clone, Error)]
pub enum ModelerError {
    #[error("Lineage error: {0}")]
    Lineage(#[from] LineageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("{other} is on the {found} plane but {survivor} is on the {expected} plane")]
    PlaneMismatch {
        survivor: EntityId,
        expected: Plane,
        other: EntityId,
        found: Plane,
    },
}

/// Result type for modeler operations
pub type ModelerResult<T> = Result<T, ModelerError>;

/// Outcome of a union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniteOutcome {
    /// Entity whose lineage carries the union
    pub survivor: EntityId,
    /// Name of the union feature, or `SkippedDeleted` if every operand was deleted
    pub result: Mutation,
    /// Operands newly deleted by the union
    pub absorbed: Vec<EntityId>,
    /// Operands left out because they were already deleted
    pub skipped: Vec<EntityId>,
}

/// Outcome of a subtraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtractOutcome {
    /// One difference per blank, in the order given
    pub results: Vec<(EntityId, Mutation)>,
    /// Tools newly deleted by the subtraction
    pub absorbed: Vec<EntityId>,
    /// Tools left out because they were already deleted
    pub skipped_tools: Vec<EntityId>,
}

/// Drawing facade over a geometry backend
pub struct Modeler<B, T = BracketUnits> {
    backend: B,
    translator: T,
    options: ModelerOptions,
    lineages: LineageTracker,
    router: LayerRouter,
    registry: EntityRegistry,
    history: OperationHistory,
}

impl<B: GeometryBackend> Modeler<B> {
    /// Create a modeler with default options
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, ModelerOptions::default())
    }

    /// Create a modeler with the given options
    pub fn with_options(backend: B, options: ModelerOptions) -> Self {
        Self::with_translator(backend, BracketUnits::default(), options)
    }
}

impl<B: GeometryBackend, T: ExpressionTranslator> Modeler<B, T> {
    /// Create a modeler with a custom expression translator
    pub fn with_translator(backend: B, translator: T, options: ModelerOptions) -> Self {
        let router = LayerRouter::with_auxiliary_layers(options.auxiliary_layers.iter().copied());
        tracing::debug!(
            "Modeler attached to '{}' backend (available: {})",
            backend.name(),
            backend.is_available()
        );
        Self {
            backend,
            translator,
            options,
            lineages: LineageTracker::new(),
            router,
            registry: EntityRegistry::new(),
            history: OperationHistory::new(),
        }
    }

    // ============== Accessors ==============

    /// Get the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get mutable access to the backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consume the modeler, returning the backend
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Get the options
    pub fn options(&self) -> &ModelerOptions {
        &self.options
    }

    /// Get the lineage tracker
    pub fn lineages(&self) -> &LineageTracker {
        &self.lineages
    }

    /// Get the layer router
    pub fn router(&self) -> &LayerRouter {
        &self.router
    }

    /// Get the deletion registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Get the operation history
    pub fn history(&self) -> &OperationHistory {
        &self.history
    }

    /// Current backend name of an entity
    pub fn current_name(&self, id: &EntityId) -> ModelerResult<VersionedName> {
        Ok(self.lineages.current_name(id)?)
    }

    /// Plane an entity was created on
    pub fn plane_of(&self, id: &EntityId) -> ModelerResult<Plane> {
        Ok(self.router.plane_of(id)?)
    }

    /// Check if an entity is deleted
    pub fn is_deleted(&self, id: &EntityId) -> bool {
        self.registry.is_deleted(id)
    }

    /// Commit pending feature-tree changes
    pub fn run(&mut self) -> ModelerResult<()> {
        self.backend.run()?;
        Ok(())
    }

    // ============== Helpers ==============

    /// Translate a client value into backend syntax
    fn literal(&self, value: &str) -> String {
        self.translator.to_backend_literal(value)
    }

    /// Make a backend literal available to a feature property
    ///
    /// With intermediate parameters enabled the literal is stored as
    /// `{feature}_{field}` and the parameter name is returned.
    fn store_param(
        &mut self,
        feature: &str,
        field: &str,
        literal: String,
    ) -> ModelerResult<String> {
        if !self.options.intermediate_params {
            return Ok(literal);
        }
        let param = format!("{}_{}", feature, field);
        self.backend.set_parameter(&param, &literal)?;
        Ok(param)
    }

    /// Fail with `UnknownEntity` unless every id is tracked
    fn ensure_known(&self, ids: &[EntityId]) -> ModelerResult<()> {
        for id in ids {
            self.lineages.lineage(id)?;
        }
        Ok(())
    }

    /// Fail unless every operand lives on the survivor's plane
    fn ensure_same_plane<'a>(
        &self,
        survivor: &EntityId,
        expected: Plane,
        others: impl IntoIterator<Item = &'a EntityId>,
    ) -> ModelerResult<()> {
        for other in others {
            let found = self.router.plane_of(other)?;
            if found != expected {
                return Err(ModelerError::PlaneMismatch {
                    survivor: survivor.clone(),
                    expected,
                    other: other.clone(),
                    found,
                });
            }
        }
        Ok(())
    }

    /// Terminate the lineages of entities the registry just deleted
    fn retire_all(&mut self, ids: &[EntityId]) -> ModelerResult<()> {
        for id in ids {
            self.lineages.retire(id)?;
        }
        Ok(())
    }

    /// Log a committed backend feature
    fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// End an operation, committing the feature tree if configured to
    fn finish(&mut self) -> ModelerResult<()> {
        if self.options.run_after_each_op {
            self.backend.run()?;
        }
        Ok(())
    }
}
