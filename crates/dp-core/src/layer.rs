//! Layer Routing
//!
//! Drawing layers are routed to one of two backend planes: ordinary
//! physical geometry goes to the primary plane, mesh and port constructs to
//! the auxiliary one. Plane membership is fixed when an entity is created.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AUXILIARY_LAYERS, MAIN_WORKPLANE, MESH_PORT_WORKPLANE};
use crate::error::{LineageError, LineageResult};
use crate::name::{EntityId, VersionedName};

/// A drawing layer number
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Layer(pub u32);

impl Layer {
    pub const DEFAULT: Layer = Layer(0);
    pub const TRACK: Layer = Layer(1);
    pub const GAP: Layer = Layer(2);
    pub const MASK: Layer = Layer(3);
    pub const RLC: Layer = Layer(4);
    pub const MESH: Layer = Layer(5);
    pub const PORT: Layer = Layer(6);

    // Membrane wafer layers
    pub const BACKSIDE: Layer = Layer(10);
    pub const FRONTSIDE_MEMBRANE: Layer = Layer(11);
    pub const FRONTSIDE_ALIGNMENT: Layer = Layer(12);
    pub const FRONTSIDE_SIN: Layer = Layer(13);
    pub const FRONTSIDE_AL: Layer = Layer(14);
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}", self.0)
    }
}

/// Destination plane of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plane {
    /// Ordinary physical geometry
    #[default]
    Primary,
    /// Mesh and port constructs
    Auxiliary,
}

impl Plane {
    /// Name of the backend workplane holding this plane's features
    pub fn workplane(self) -> &'static str {
        match self {
            Plane::Primary => MAIN_WORKPLANE,
            Plane::Auxiliary => MESH_PORT_WORKPLANE,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Primary => f.write_str("primary"),
            Plane::Auxiliary => f.write_str("auxiliary"),
        }
    }
}

/// Routes layers to planes and remembers each entity's plane
#[derive(Debug, Clone)]
pub struct LayerRouter {
    /// Layers routed to the auxiliary plane
    auxiliary_layers: Vec<Layer>,
    /// Plane of every created entity
    assignments: HashMap<EntityId, Plane>,
}

impl Default for LayerRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRouter {
    /// Create a router with MESH and PORT as the auxiliary layers
    pub fn new() -> Self {
        Self::with_auxiliary_layers(DEFAULT_AUXILIARY_LAYERS)
    }

    /// Create a router with a custom set of auxiliary layers
    pub fn with_auxiliary_layers(layers: impl IntoIterator<Item = Layer>) -> Self {
        Self {
            auxiliary_layers: layers.into_iter().collect(),
            assignments: HashMap::new(),
        }
    }

    /// Get the layers routed to the auxiliary plane
    pub fn auxiliary_layers(&self) -> &[Layer] {
        &self.auxiliary_layers
    }

    /// Plane a layer routes to
    pub fn plane_for_layer(&self, layer: Layer) -> Plane {
        if self.auxiliary_layers.contains(&layer) {
            Plane::Auxiliary
        } else {
            Plane::Primary
        }
    }

    /// Record the plane of an entity
    ///
    /// Assigning the same plane again is a no-op; a different plane fails.
    pub fn assign(&mut self, id: EntityId, plane: Plane) -> LineageResult<()> {
        match self.assignments.get(&id) {
            Some(&existing) if existing == plane => Ok(()),
            Some(&existing) => Err(LineageError::AlreadyAssigned {
                id,
                existing,
                requested: plane,
            }),
            None => {
                self.assignments.insert(id, plane);
                Ok(())
            }
        }
    }

    /// Assign an entity to the plane its layer routes to
    pub fn route(&mut self, id: EntityId, layer: Layer) -> LineageResult<Plane> {
        let plane = self.plane_for_layer(layer);
        self.assign(id, plane)?;
        Ok(plane)
    }

    /// Get the plane of an entity
    pub fn plane_of(&self, id: &EntityId) -> LineageResult<Plane> {
        self.assignments
            .get(id)
            .copied()
            .ok_or_else(|| LineageError::UnknownEntity(id.clone()))
    }

    /// Get the plane of an entity from any of its versioned names
    pub fn plane_of_name(&self, name: &VersionedName) -> LineageResult<Plane> {
        self.plane_of(name.base())
    }

    /// Iterate over the entities assigned to a plane
    pub fn entities_on(&self, plane: Plane) -> impl Iterator<Item = &EntityId> {
        self.assignments
            .iter()
            .filter(move |(_, p)| **p == plane)
            .map(|(id, _)| id)
    }
}
