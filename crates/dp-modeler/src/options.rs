//! Modeler options

use dp_core::Layer;
use dp_core::constants::DEFAULT_AUXILIARY_LAYERS;
use serde::{Deserialize, Serialize};

/// Options controlling how the modeler talks to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelerOptions {
    /// Store sizes, positions and displacements as `{feature}_{field}`
    /// entries of the intermediate parameter table instead of inlining
    /// the expressions (some engines fail on long inline expressions)
    pub intermediate_params: bool,
    /// Commit the feature tree after every operation
    pub run_after_each_op: bool,
    /// Layers routed to the auxiliary plane
    pub auxiliary_layers: Vec<Layer>,
}

impl Default for ModelerOptions {
    fn default() -> Self {
        Self {
            intermediate_params: true,
            run_after_each_op: false,
            auxiliary_layers: DEFAULT_AUXILIARY_LAYERS.to_vec(),
        }
    }
}

impl ModelerOptions {
    /// Options that inline every expression into feature properties
    pub fn inline() -> Self {
        Self {
            intermediate_params: false,
            ..Self::default()
        }
    }
}
