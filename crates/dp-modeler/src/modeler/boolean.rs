//! Boolean operations, deletion and boundary assignment

use dp_core::{DeleteStatus, EntityId, LineageError, Mutation, Plane, VersionedName};

use super::{Modeler, ModelerError, ModelerResult, SubtractOutcome, UniteOutcome};
use crate::backend::{
    BackendError, FeatureKind, GeometryBackend, ParamValue, SelectionSlot, SelectionTarget,
};
use crate::constants::{DELETE_PREFIX, PEC_SELECTION};
use crate::expr::ExpressionTranslator;
use crate::history::{HistoryEntry, OperationKind};

impl<B: GeometryBackend, T: ExpressionTranslator> Modeler<B, T> {
    /// Delete an entity
    ///
    /// Deleting an entity twice reports [`DeleteStatus::AlreadyDeleted`]
    /// and sends nothing to the backend. A delete feature left behind by an
    /// earlier failed attempt is reused, so the call can be retried.
    pub fn delete(&mut self, id: &EntityId) -> ModelerResult<DeleteStatus> {
        let status = self.remove(id)?;
        self.finish()?;
        Ok(status)
    }

    /// Issue the delete feature of an entity
    pub(super) fn remove(&mut self, id: &EntityId) -> ModelerResult<DeleteStatus> {
        let input = self.lineages.current_name(id)?;
        if self.registry.is_deleted(id) {
            tracing::info!("{} already deleted", id);
            return Ok(DeleteStatus::AlreadyDeleted);
        }
        let plane = self.router.plane_of(id)?;

        let feature = format!("{}{}", DELETE_PREFIX, id);
        let handle = match self.backend.find_feature(plane, &feature) {
            Ok(handle) => {
                tracing::debug!("Reusing delete feature {}", feature);
                handle
            }
            Err(BackendError::UnknownFeature(_)) => {
                self.backend
                    .create_feature(plane, &feature, FeatureKind::Delete, &[])?
            }
            Err(e) => return Err(e.into()),
        };
        self.backend
            .select(handle, SelectionSlot::Input, &SelectionTarget::objects([&input]))?;

        let status = self.registry.mark_deleted(id);
        self.lineages.retire(id)?;
        tracing::info!("{} deleted ({})", id, input);

        let mut entry = HistoryEntry::new(OperationKind::Delete, plane, feature);
        entry.inputs.push(input);
        entry.deleted.push(id.clone());
        self.record(entry);
        Ok(status)
    }

    /// Unite entities into the first live one
    ///
    /// Operands that are already deleted are left out. The first remaining
    /// operand survives and its next generation names the union; unless
    /// `keep_originals` is set the other operands are deleted. All
    /// operands must share one plane.
    pub fn unite(
        &mut self,
        ids: &[EntityId],
        keep_originals: bool,
    ) -> ModelerResult<UniteOutcome> {
        if ids.is_empty() {
            return Err(LineageError::EmptyOperandList.into());
        }
        self.ensure_known(ids)?;

        let (live, skipped): (Vec<EntityId>, Vec<EntityId>) = ids
            .iter()
            .cloned()
            .partition(|id| !self.registry.is_deleted(id));
        for id in &skipped {
            tracing::warn!("{} left out of union, it was deleted", id);
        }

        let Some(survivor) = live.first().cloned() else {
            return Ok(UniteOutcome {
                survivor: ids[0].clone(),
                result: Mutation::SkippedDeleted,
                absorbed: Vec::new(),
                skipped,
            });
        };
        let plane = self.router.plane_of(&survivor)?;
        self.ensure_same_plane(&survivor, plane, &live[1..])?;

        let inputs = live
            .iter()
            .map(|id| self.lineages.current_name(id))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(output) = self.lineages.peek_next_name(&survivor)?.into_name() else {
            return Err(LineageError::UnknownEntity(survivor).into());
        };
        let feature = output.to_string();

        let mut params = vec![("intbnd", ParamValue::Switch(false))];
        if keep_originals {
            params.push(("keep", ParamValue::Switch(true)));
        }
        let handle = self
            .backend
            .create_feature(plane, &feature, FeatureKind::Union, &params)?;

        let result = self.lineages.next_name(&survivor)?;
        let mut entry = HistoryEntry::new(OperationKind::Unite, plane, feature.clone());
        entry.inputs = inputs.clone();
        entry.modified.push(survivor.clone());
        self.record(entry);

        self.backend
            .select(handle, SelectionSlot::Input, &SelectionTarget::objects(&inputs))?;
        let merge = self.registry.merge(&live, keep_originals)?;
        self.retire_all(&merge.absorbed)?;
        if let Some(entry) = self.history.last_mut() {
            entry.deleted = merge.absorbed.clone();
        }
        tracing::info!(
            "Union {} of {} entities (absorbed: {})",
            feature,
            live.len(),
            merge.absorbed.len()
        );
        self.finish()?;

        Ok(UniteOutcome {
            survivor,
            result,
            absorbed: merge.absorbed,
            skipped,
        })
    }

    /// Subtract tool entities from each blank entity
    ///
    /// Every live blank gets its own difference feature. Unless
    /// `keep_originals` is set the tools are deleted and attributed to the
    /// first live blank as soon as its difference is in place.
    pub fn subtract(
        &mut self,
        blanks: &[EntityId],
        tools: &[EntityId],
        keep_originals: bool,
    ) -> ModelerResult<SubtractOutcome> {
        if blanks.is_empty() || tools.is_empty() {
            return Err(LineageError::EmptyOperandList.into());
        }
        self.ensure_known(blanks)?;
        self.ensure_known(tools)?;

        let (live_tools, skipped_tools): (Vec<EntityId>, Vec<EntityId>) = tools
            .iter()
            .cloned()
            .partition(|id| !self.registry.is_deleted(id));
        for id in &skipped_tools {
            tracing::warn!("{} left out of subtraction, it was deleted", id);
        }
        if live_tools.is_empty() {
            return Err(LineageError::EmptyOperandList.into());
        }

        let Some(survivor) = blanks.iter().find(|id| !self.registry.is_deleted(id)).cloned()
        else {
            tracing::warn!("Subtraction skipped, every blank was deleted");
            return Ok(SubtractOutcome {
                results: blanks
                    .iter()
                    .map(|id| (id.clone(), Mutation::SkippedDeleted))
                    .collect(),
                absorbed: Vec::new(),
                skipped_tools,
            });
        };
        let plane = self.router.plane_of(&survivor)?;
        let live_blanks = blanks.iter().filter(|id| !self.registry.is_deleted(id));
        self.ensure_same_plane(&survivor, plane, live_blanks.chain(&live_tools))?;

        let tool_inputs = live_tools
            .iter()
            .map(|id| self.lineages.current_name(id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(blanks.len());
        let mut absorbed = Vec::new();
        let mut merged = false;
        for blank in blanks {
            let mutation = self.difference(blank, plane, &tool_inputs, keep_originals)?;
            if !merged && matches!(mutation, Mutation::Mutated(_)) {
                let mut operands = vec![survivor.clone()];
                operands.extend(live_tools.iter().cloned());
                let merge = self.registry.merge(&operands, keep_originals)?;
                self.retire_all(&merge.absorbed)?;
                if let Some(entry) = self.history.last_mut() {
                    entry.deleted = merge.absorbed.clone();
                }
                absorbed = merge.absorbed;
                merged = true;
            }
            results.push((blank.clone(), mutation));
        }
        self.finish()?;

        Ok(SubtractOutcome {
            results,
            absorbed,
            skipped_tools,
        })
    }

    /// Issue the difference feature of one blank
    fn difference(
        &mut self,
        blank: &EntityId,
        plane: Plane,
        tool_inputs: &[VersionedName],
        keep_originals: bool,
    ) -> ModelerResult<Mutation> {
        let input = self.lineages.current_name(blank)?;
        let Some(output) = self.lineages.peek_next_name(blank)?.into_name() else {
            tracing::warn!("{} not subtracted from, it was deleted", blank);
            return Ok(Mutation::SkippedDeleted);
        };
        let feature = output.to_string();

        let params = if keep_originals {
            vec![("keep", ParamValue::Switch(true))]
        } else {
            Vec::new()
        };
        let handle = self
            .backend
            .create_feature(plane, &feature, FeatureKind::Difference, &params)?;

        let issued = self.lineages.next_name(blank)?;
        let mut entry = HistoryEntry::new(OperationKind::Subtract, plane, feature.clone());
        entry.inputs.push(input.clone());
        entry.inputs.extend(tool_inputs.iter().cloned());
        entry.modified.push(blank.clone());
        self.record(entry);

        self.backend
            .select(handle, SelectionSlot::Input, &SelectionTarget::objects([&input]))?;
        self.backend
            .select(handle, SelectionSlot::Input2, &SelectionTarget::objects(tool_inputs))?;
        tracing::info!("Difference {} ({} minus {} tools)", feature, input, tool_inputs.len());
        Ok(issued)
    }

    /// Make entities contribute to the perfect electric conductor selection
    ///
    /// Only primary-plane geometry can carry the boundary. Deleted entities
    /// are skipped; the entities actually assigned are returned.
    pub fn assign_perfect_e(&mut self, ids: &[EntityId]) -> ModelerResult<Vec<EntityId>> {
        self.ensure_known(ids)?;

        let mut assigned = Vec::with_capacity(ids.len());
        for id in ids {
            if self.registry.is_deleted(id) {
                tracing::warn!("Perfect E not assigned to {}, it was deleted", id);
                continue;
            }
            let plane = self.router.plane_of(id)?;
            if plane != Plane::Primary {
                return Err(ModelerError::InvalidOperation(format!(
                    "perfect E needs primary-plane geometry, {} is on the {} plane",
                    id, plane
                )));
            }

            let name = self.lineages.current_name(id)?;
            let feature = name.to_string();
            let handle = self.backend.find_feature(plane, &feature)?;
            self.backend.set_property(
                handle,
                "contributeto",
                ParamValue::Text(PEC_SELECTION.into()),
            )?;
            tracing::info!("Perfect E assigned to {}", name);

            let mut entry = HistoryEntry::new(OperationKind::AssignPerfectE, plane, feature);
            entry.inputs.push(name);
            self.record(entry);
            assigned.push(id.clone());
        }

        self.finish()?;
        Ok(assigned)
    }
}
