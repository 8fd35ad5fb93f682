//! Path sweeps
//!
//! A trace of constant width along a polyline is built from helper
//! features: the open path, its fillet, a square profile on a plane normal
//! to the path start, the sweep of the profile along the path, and the
//! cross-section of the swept solid with the layer's workplane. The swept
//! solid is deleted once the cross-section exists.

use dp_core::{EntityId, Layer, LineageError, VersionedName};

use super::transform::TransformPlan;
use super::{Modeler, ModelerError, ModelerResult};
use crate::backend::{FeatureKind, GeometryBackend, ParamValue, SelectionSlot, SelectionTarget};
use crate::expr::ExpressionTranslator;
use crate::history::OperationKind;

/// Suffixes of the helper entities of a sweep
const HELPER_SUFFIXES: [&str; 3] = ["line", "profile", "sweep"];

impl<B: GeometryBackend, T: ExpressionTranslator> Modeler<B, T> {
    /// Sweep a square profile of `width` along a polyline
    ///
    /// # Arguments
    /// * `name` - Name of the resulting planar trace
    /// * `layer` - Layer routing the trace and its helpers to a plane
    /// * `points` - Path vertices, at least two
    /// * `port_ori` - In-plane direction of the path at its start
    /// * `port_pos` - Start of the path, where the profile is centered
    /// * `width` - Side of the square profile
    /// * `fillet_radius` - Radius of the path corners
    ///
    /// The helpers are tracked as `{name}_line`, `{name}_profile` and
    /// `{name}_sweep`; none of them is live once the call returns.
    #[allow(clippy::too_many_arguments)]
    pub fn sweep_along_path(
        &mut self,
        name: &str,
        layer: Layer,
        points: &[[&str; 2]],
        port_ori: [&str; 2],
        port_pos: [&str; 2],
        width: &str,
        fillet_radius: &str,
    ) -> ModelerResult<VersionedName> {
        if points.len() < 2 {
            return Err(ModelerError::InvalidOperation(format!(
                "path of {} needs at least 2 points, got {}",
                name,
                points.len()
            )));
        }
        let id = EntityId::new(name)?;
        let [line_id, profile_id, sweep_id] =
            HELPER_SUFFIXES.map(|suffix| EntityId::new(format!("{}_{}", name, suffix)));
        let (line_id, profile_id, sweep_id) = (line_id?, profile_id?, sweep_id?);
        for taken in [&id, &line_id, &profile_id, &sweep_id] {
            if self.lineages.contains(taken) {
                return Err(LineageError::DuplicateEntity(taken.clone()).into());
            }
        }

        // Path
        self.add_entity(line_id.as_str(), layer, FeatureKind::Polygon, |m, feature| {
            let mut table = Vec::with_capacity(points.len());
            for (i, [x, y]) in points.iter().enumerate() {
                let x = m.literal(x);
                let y = m.literal(y);
                table.push(vec![
                    m.store_param(feature, &format!("point_{}_x", i), x)?,
                    m.store_param(feature, &format!("point_{}_y", i), y)?,
                ]);
            }
            Ok(vec![
                ("source", ParamValue::Text("table".into())),
                ("type", ParamValue::Text("open".into())),
                ("table", ParamValue::Table(table)),
            ])
        })?;

        // Only inner vertices of an open path have corners to round
        let corners = points.len() as u32 - 2;
        if corners > 0 {
            self.transform(
                &line_id,
                OperationKind::Fillet,
                FeatureKind::Fillet,
                |m, _, input, _| {
                    Ok(TransformPlan {
                        params: vec![("radius", ParamValue::Expr(m.literal(fillet_radius)))],
                        slot: SelectionSlot::Point,
                        target: SelectionTarget::Points {
                            object: input.to_string(),
                            indices: (2..=corners + 1).collect(),
                        },
                    })
                },
            )?;
        }
        // Straight segments plus one arc per rounded corner
        let edges = 2 * points.len() as u32 - 3;
        let path = self.lineages.current_name(&line_id)?;

        // Profile
        let profile_name = profile_id.as_str().to_string();
        self.add_entity(&profile_name, layer, FeatureKind::Profile, |m, feature| {
            let ori_x = m.literal(port_ori[0]);
            let ori_y = m.literal(port_ori[1]);
            let pos_x = m.literal(port_pos[0]);
            let pos_y = m.literal(port_pos[1]);
            let normal = vec![
                m.store_param(feature, "port_ori_x", ori_x)?,
                m.store_param(feature, "port_ori_y", ori_y)?,
                "0".to_string(),
            ];
            let origin = vec![
                m.store_param(feature, "port_pos_x", pos_x)?,
                m.store_param(feature, "port_pos_y", pos_y)?,
                "0".to_string(),
            ];
            Ok(vec![
                ("planetype", ParamValue::Text("normalvector".into())),
                ("normalvector", ParamValue::Vector(normal)),
                ("normalcoord", ParamValue::Vector(origin)),
                ("base", ParamValue::Text("center".into())),
                ("size", ParamValue::Expr(m.literal(width))),
            ])
        })?;

        // Sweep, consuming the path and the profile
        let (_, handle) = self.add_entity(
            sweep_id.as_str(),
            layer,
            FeatureKind::Sweep,
            |_, _| {
                Ok(vec![
                    ("smooth", ParamValue::Switch(false)),
                    ("keep", ParamValue::Switch(false)),
                ])
            },
        )?;
        let consumed = [sweep_id.clone(), line_id.clone(), profile_id.clone()];
        let merge = self.registry.merge(&consumed, false)?;
        self.retire_all(&merge.absorbed)?;
        if let Some(entry) = self.history.last_mut() {
            entry.inputs = vec![VersionedName::new(profile_id.clone(), 0), path.clone()];
            entry.deleted = merge.absorbed.clone();
        }
        self.backend.select(
            handle,
            SelectionSlot::Face,
            &SelectionTarget::Points {
                object: profile_name,
                indices: vec![1],
            },
        )?;
        self.backend.select(
            handle,
            SelectionSlot::Edge,
            &SelectionTarget::Points {
                object: path.to_string(),
                indices: (1..=edges).collect(),
            },
        )?;

        // Trace in the workplane
        let (created, handle) =
            self.add_entity(name, layer, FeatureKind::CrossSection, |_, _| {
                Ok(vec![("intersect", ParamValue::Text("selected".into()))])
            })?;
        if let Some(entry) = self.history.last_mut() {
            entry.inputs.push(VersionedName::new(sweep_id.clone(), 0));
        }
        self.backend
            .select(handle, SelectionSlot::Input, &SelectionTarget::objects([&sweep_id]))?;
        self.remove(&sweep_id)?;

        tracing::info!(
            "{} swept along {} points ({} edges) on the {} plane",
            created,
            points.len(),
            edges,
            self.router.plane_of(&id)?
        );
        self.finish()?;
        Ok(created)
    }
}
