//! Global constants for dp-core

use crate::layer::Layer;

/// Backend workplane holding ordinary physical geometry
pub const MAIN_WORKPLANE: &str = "main_wp";

/// Backend workplane holding mesh and port constructs
pub const MESH_PORT_WORKPLANE: &str = "mesh_port_wp";

/// Layers routed to the auxiliary plane unless configured otherwise
pub const DEFAULT_AUXILIARY_LAYERS: [Layer; 2] = [Layer::MESH, Layer::PORT];

/// Prefix character of a versioned name (`t<generation>_<base>`)
pub const VERSION_PREFIX: char = 't';

/// Separator between the generation and the base name
pub const VERSION_SEPARATOR: char = '_';
