//! Transforms
//!
//! A transform creates a new backend feature named after the entity's next
//! generation, selecting the current generation as its input.

use dp_core::{EntityId, Mutation, Plane, VersionedName};

use super::{Modeler, ModelerError, ModelerResult};
use crate::backend::{FeatureKind, GeometryBackend, ParamValue, SelectionSlot, SelectionTarget};
use crate::expr::ExpressionTranslator;
use crate::history::{HistoryEntry, OperationKind};

/// Properties and input selection of a transform feature
pub(super) struct TransformPlan {
    pub(super) params: Vec<(&'static str, ParamValue)>,
    pub(super) slot: SelectionSlot,
    pub(super) target: SelectionTarget,
}

impl TransformPlan {
    /// Plan that selects the whole input object
    fn on_input(params: Vec<(&'static str, ParamValue)>, input: &VersionedName) -> Self {
        Self {
            params,
            slot: SelectionSlot::Input,
            target: SelectionTarget::objects([input]),
        }
    }
}

impl<B: GeometryBackend, T: ExpressionTranslator> Modeler<B, T> {
    /// Translate entities in their plane
    ///
    /// The out-of-plane component must evaluate to zero.
    pub fn translate(
        &mut self,
        ids: &[EntityId],
        vector: [&str; 3],
    ) -> ModelerResult<Vec<(EntityId, Mutation)>> {
        self.ensure_known(ids)?;
        let dz = self.backend.evaluate_numeric(&self.literal(vector[2]))?;
        if dz != 0.0 {
            return Err(ModelerError::InvalidOperation(format!(
                "translation out of the workplane (z = {})",
                vector[2]
            )));
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let mutation = self.transform(
                id,
                OperationKind::Translate,
                FeatureKind::Move,
                |m, _, input, output| {
                    let dx = m.literal(vector[0]);
                    let dy = m.literal(vector[1]);
                    let displacement = vec![
                        m.store_param(output, "x", dx)?,
                        m.store_param(output, "y", dy)?,
                    ];
                    Ok(TransformPlan::on_input(
                        vec![("displ", ParamValue::Vector(displacement))],
                        input,
                    ))
                },
            )?;
            outcomes.push((id.clone(), mutation));
        }

        self.finish()?;
        Ok(outcomes)
    }

    /// Rotate entities in their plane around a center (origin by default)
    pub fn rotate(
        &mut self,
        ids: &[EntityId],
        angle: &str,
        center: Option<[&str; 2]>,
    ) -> ModelerResult<Vec<(EntityId, Mutation)>> {
        self.ensure_known(ids)?;
        let [cx, cy] = center.unwrap_or(["0", "0"]);

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let mutation =
                self.transform(id, OperationKind::Rotate, FeatureKind::Rotate, |m, _, input, _| {
                    let params = vec![
                        ("rot", ParamValue::Expr(m.literal(angle))),
                        ("pos", ParamValue::Vector(vec![m.literal(cx), m.literal(cy)])),
                    ];
                    Ok(TransformPlan::on_input(params, input))
                })?;
            outcomes.push((id.clone(), mutation));
        }

        self.finish()?;
        Ok(outcomes)
    }

    /// Fillet vertices of an entity
    ///
    /// With `vertices` unset every vertex is filleted; the vertex count is
    /// queried from the backend. Indices are 1-based.
    pub fn fillet(
        &mut self,
        id: &EntityId,
        radius: &str,
        vertices: Option<&[u32]>,
    ) -> ModelerResult<Mutation> {
        if let Some(indices) = vertices
            && (indices.is_empty() || indices.contains(&0))
        {
            return Err(ModelerError::InvalidOperation(format!(
                "fillet of {} needs 1-based vertex indices, got {:?}",
                id, indices
            )));
        }

        let mutation =
            self.transform(id, OperationKind::Fillet, FeatureKind::Fillet, |m, plane, input, _| {
                let indices = match vertices {
                    Some(indices) => indices.to_vec(),
                    None => {
                        let count = m.backend.vertex_count(plane, &input.to_string())?;
                        if count == 0 {
                            return Err(ModelerError::InvalidOperation(format!(
                                "{} has no vertices to fillet",
                                input
                            )));
                        }
                        (1..=count).collect()
                    }
                };
                Ok(TransformPlan {
                    params: vec![("radius", ParamValue::Expr(m.literal(radius)))],
                    slot: SelectionSlot::Point,
                    target: SelectionTarget::Points {
                        object: input.to_string(),
                        indices,
                    },
                })
            })?;

        self.finish()?;
        Ok(mutation)
    }

    /// Issue one transform feature for an entity
    ///
    /// Deleted entities are skipped. The new generation and its history
    /// entry are committed as soon as the backend created the feature, so a
    /// failed selection still leaves the name used up.
    pub(super) fn transform<F>(
        &mut self,
        id: &EntityId,
        operation: OperationKind,
        kind: FeatureKind,
        plan: F,
    ) -> ModelerResult<Mutation>
    where
        F: FnOnce(&mut Self, Plane, &VersionedName, &str) -> ModelerResult<TransformPlan>,
    {
        let input = self.lineages.current_name(id)?;
        if self.registry.is_deleted(id) {
            tracing::warn!("{} not transformed ({}), it was deleted", id, kind);
            return Ok(Mutation::SkippedDeleted);
        }
        let plane = self.router.plane_of(id)?;
        let Mutation::Mutated(output) = self.lineages.peek_next_name(id)? else {
            tracing::warn!("{} not transformed ({}), its lineage is retired", id, kind);
            return Ok(Mutation::SkippedDeleted);
        };
        let feature = output.to_string();

        let TransformPlan {
            params,
            slot,
            target,
        } = plan(self, plane, &input, &feature)?;
        let handle = self.backend.create_feature(plane, &feature, kind, &params)?;

        let issued = self.lineages.next_name(id)?;
        debug_assert_eq!(issued.name(), Some(&output));
        let mut entry = HistoryEntry::new(operation, plane, feature);
        entry.inputs.push(input.clone());
        entry.modified.push(id.clone());
        self.record(entry);

        self.backend.select(handle, slot, &target)?;
        tracing::info!("{} {} ({} -> {})", kind, id, input, output);
        Ok(issued)
    }
}
