//! Primitive creation

use dp_core::{EntityId, Layer, LineageError, VersionedName};

use super::{Modeler, ModelerError, ModelerResult};
use crate::backend::{FeatureHandle, FeatureKind, GeometryBackend, ParamValue};
use crate::expr::ExpressionTranslator;
use crate::history::{HistoryEntry, OperationKind};

/// Intermediate parameter fields of the size components
const SIZE_FIELDS: [&str; 3] = ["width", "height", "depth"];

/// Intermediate parameter fields of the position components
const POS_FIELDS: [&str; 3] = ["pos_x", "pos_y", "pos_z"];

/// Corner coordinate of an extent given its center
fn corner_of(center: &str, size: &str) -> String {
    format!("({})-({})/2", center, size)
}

impl<B: GeometryBackend, T: ExpressionTranslator> Modeler<B, T> {
    /// Set a global parameter
    pub fn set_variable(&mut self, name: &str, value: &str) -> ModelerResult<()> {
        let literal = self.literal(value);
        self.backend.set_parameter(name, &literal)?;
        tracing::debug!("Parameter {} = {}", name, literal);
        Ok(())
    }

    /// Draw a rectangle from its corner
    pub fn rect(
        &mut self,
        name: &str,
        layer: Layer,
        pos: [&str; 2],
        size: [&str; 2],
    ) -> ModelerResult<VersionedName> {
        self.create(name, layer, FeatureKind::Rectangle, |m, feature| {
            m.extent_params(feature, &pos, &size)
        })
    }

    /// Draw a rectangle from its center
    pub fn rect_center(
        &mut self,
        name: &str,
        layer: Layer,
        center: [&str; 2],
        size: [&str; 2],
    ) -> ModelerResult<VersionedName> {
        let x = corner_of(center[0], size[0]);
        let y = corner_of(center[1], size[1]);
        self.rect(name, layer, [x.as_str(), y.as_str()], size)
    }

    /// Draw a box from its corner
    pub fn block(
        &mut self,
        name: &str,
        layer: Layer,
        pos: [&str; 3],
        size: [&str; 3],
    ) -> ModelerResult<VersionedName> {
        self.create(name, layer, FeatureKind::Block, |m, feature| {
            m.extent_params(feature, &pos, &size)
        })
    }

    /// Draw a box from its center
    pub fn block_center(
        &mut self,
        name: &str,
        layer: Layer,
        center: [&str; 3],
        size: [&str; 3],
    ) -> ModelerResult<VersionedName> {
        let x = corner_of(center[0], size[0]);
        let y = corner_of(center[1], size[1]);
        let z = corner_of(center[2], size[2]);
        self.block(name, layer, [x.as_str(), y.as_str(), z.as_str()], size)
    }

    /// Draw a polygon through a list of points
    ///
    /// A closed polygon is a filled solid and needs at least three points;
    /// an open one is a polyline and needs two.
    pub fn polygon(
        &mut self,
        name: &str,
        layer: Layer,
        points: &[[&str; 2]],
        closed: bool,
    ) -> ModelerResult<VersionedName> {
        let needed = if closed { 3 } else { 2 };
        if points.len() < needed {
            return Err(ModelerError::InvalidOperation(format!(
                "polygon {} needs at least {} points, got {}",
                name,
                needed,
                points.len()
            )));
        }

        self.create(name, layer, FeatureKind::Polygon, |m, _| {
            let table = points
                .iter()
                .map(|[x, y]| vec![m.literal(x), m.literal(y)])
                .collect();
            let shape = if closed { "solid" } else { "open" };
            Ok(vec![
                ("source", ParamValue::Text("table".into())),
                ("type", ParamValue::Text(shape.into())),
                ("table", ParamValue::Table(table)),
            ])
        })
    }

    /// Draw one primitive as a complete operation
    fn create<F>(
        &mut self,
        name: &str,
        layer: Layer,
        kind: FeatureKind,
        build: F,
    ) -> ModelerResult<VersionedName>
    where
        F: FnOnce(&mut Self, &str) -> ModelerResult<Vec<(&'static str, ParamValue)>>,
    {
        let (created, _) = self.add_entity(name, layer, kind, build)?;
        self.finish()?;
        Ok(created)
    }

    /// Register a new entity after the backend accepted its feature
    pub(super) fn add_entity<F>(
        &mut self,
        name: &str,
        layer: Layer,
        kind: FeatureKind,
        build: F,
    ) -> ModelerResult<(VersionedName, FeatureHandle)>
    where
        F: FnOnce(&mut Self, &str) -> ModelerResult<Vec<(&'static str, ParamValue)>>,
    {
        let id = EntityId::new(name)?;
        if self.lineages.contains(&id) {
            return Err(LineageError::DuplicateEntity(id).into());
        }
        let plane = self.router.plane_for_layer(layer);

        let params = build(self, id.as_str())?;
        let handle = self
            .backend
            .create_feature(plane, id.as_str(), kind, &params)?;

        let created = self.lineages.register(id.clone())?;
        self.router.assign(id.clone(), plane)?;
        tracing::info!("{} {} created on the {} plane", kind, created, plane);

        let mut entry = HistoryEntry::new(OperationKind::Create(kind), plane, id.as_str());
        entry.created.push(id);
        self.record(entry);
        Ok((created, handle))
    }

    /// Size and position properties of a rectangle or box
    ///
    /// The backend rejects negative sizes, so a component whose size
    /// evaluates below zero is flipped: size `-(s)`, position `p+s`.
    fn extent_params(
        &mut self,
        feature: &str,
        pos: &[&str],
        size: &[&str],
    ) -> ModelerResult<Vec<(&'static str, ParamValue)>> {
        let mut sizes = Vec::with_capacity(size.len());
        let mut positions = Vec::with_capacity(pos.len());

        for (axis, (p, s)) in pos.iter().zip(size).enumerate() {
            let p = self.literal(p);
            let s = self.literal(s);
            let (p, s) = if self.backend.evaluate_numeric(&s)? < 0.0 {
                (format!("{}+{}", p, s), format!("-({})", s))
            } else {
                (p, s)
            };
            sizes.push(self.store_param(feature, SIZE_FIELDS[axis], s)?);
            positions.push(self.store_param(feature, POS_FIELDS[axis], p)?);
        }

        Ok(vec![
            ("size", ParamValue::Vector(sizes)),
            ("pos", ParamValue::Vector(positions)),
        ])
    }
}
