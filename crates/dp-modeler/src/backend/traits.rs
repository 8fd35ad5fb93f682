//! Geometry backend trait definitions
//!
//! These traits define the interface a geometry engine bridge must
//! implement. The engine owns the geometry; the modeler only names
//! features and wires them together.

use std::fmt;

use dp_core::Plane;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque handle to a feature created in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureHandle(pub Uuid);

impl FeatureHandle {
    /// Create a fresh random handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeatureHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of feature in the backend's feature tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// 2D rectangle
    Rectangle,
    /// 2D polygon from a point table
    Polygon,
    /// 3D block
    Block,
    /// Translation
    Move,
    /// Rotation in the workplane
    Rotate,
    /// Vertex fillet
    Fillet,
    /// Boolean union
    Union,
    /// Boolean difference
    Difference,
    /// Deletion of an object
    Delete,
    /// Square profile on a plane normal to a path
    Profile,
    /// Profile swept along the edges of a path
    Sweep,
    /// Intersection of a swept solid with the workplane
    CrossSection,
}

impl FeatureKind {
    /// Get the backend type name of this feature kind
    pub fn type_name(self) -> &'static str {
        match self {
            FeatureKind::Rectangle => "Rectangle",
            FeatureKind::Polygon => "Polygon",
            FeatureKind::Block => "Block",
            FeatureKind::Move => "Move",
            FeatureKind::Rotate => "Rotate",
            FeatureKind::Fillet => "Fillet",
            FeatureKind::Union => "Union",
            FeatureKind::Difference => "Difference",
            FeatureKind::Delete => "Delete",
            FeatureKind::Profile => "Square",
            FeatureKind::Sweep => "Sweep",
            FeatureKind::CrossSection => "CrossSection",
        }
    }

    /// Check if this kind draws a new primitive
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            FeatureKind::Rectangle | FeatureKind::Polygon | FeatureKind::Block
        )
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Value of a feature property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// A backend expression or literal
    Expr(String),
    /// Indexed expression components (one per axis)
    Vector(Vec<String>),
    /// Rows of expressions (e.g. polygon points)
    Table(Vec<Vec<String>>),
    /// A plain string setting
    Text(String),
    /// An on/off switch
    Switch(bool),
}

/// Selection slot of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionSlot {
    /// Primary input objects
    Input,
    /// Secondary input objects (tools of a difference)
    Input2,
    /// Vertices
    Point,
    /// Edges
    Edge,
    /// Faces
    Face,
}

impl SelectionSlot {
    /// Get the backend name of this slot
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionSlot::Input => "input",
            SelectionSlot::Input2 => "input2",
            SelectionSlot::Point => "point",
            SelectionSlot::Edge => "edge",
            SelectionSlot::Face => "face",
        }
    }
}

impl fmt::Display for SelectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a selection slot points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionTarget {
    /// Whole objects by feature name
    Objects(Vec<String>),
    /// Numbered vertices, edges or faces of one object, depending on the
    /// slot (1-based indices)
    Points { object: String, indices: Vec<u32> },
}

impl SelectionTarget {
    /// Select whole objects by name
    pub fn objects<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        SelectionTarget::Objects(names.into_iter().map(|n| n.to_string()).collect())
    }
}

/// Error type for backend calls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Connection lost: {0}")]
    Connection(String),

    #[error("Feature '{name}' rejected: {reason}")]
    FeatureRejected { name: String, reason: String },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Cannot evaluate '{expr}': {reason}")]
    Evaluation { expr: String, reason: String },

    #[error("Query failed: {0}")]
    Query(String),
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// The geometry backend trait
///
/// Calls are synchronous and issued strictly in program order. The backend
/// is a single stateful session, so every call takes `&mut self` where it
/// may change that state.
pub trait GeometryBackend {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Check if the backend is available
    fn is_available(&self) -> bool;

    /// Set a named parameter in the backend's parameter table
    fn set_parameter(&mut self, name: &str, value: &str) -> BackendResult<()>;

    /// Evaluate an expression to a number (SI units)
    fn evaluate_numeric(&self, expr: &str) -> BackendResult<f64>;

    /// Create a feature on a plane
    ///
    /// # Arguments
    /// * `plane` - Workplane that holds the feature
    /// * `name` - Feature name, unique within the plane
    /// * `kind` - Feature type
    /// * `params` - Initial properties
    fn create_feature(
        &mut self,
        plane: Plane,
        name: &str,
        kind: FeatureKind,
        params: &[(&str, ParamValue)],
    ) -> BackendResult<FeatureHandle>;

    /// Look up an existing feature by name
    fn find_feature(&self, plane: Plane, name: &str) -> BackendResult<FeatureHandle>;

    /// Set a property of a feature
    fn set_property(
        &mut self,
        handle: FeatureHandle,
        key: &str,
        value: ParamValue,
    ) -> BackendResult<()>;

    /// Point a selection slot of a feature at a target
    fn select(
        &mut self,
        handle: FeatureHandle,
        slot: SelectionSlot,
        target: &SelectionTarget,
    ) -> BackendResult<()>;

    /// Number of vertices of the object produced by a feature
    fn vertex_count(&self, plane: Plane, name: &str) -> BackendResult<u32>;

    /// Commit pending feature-tree changes
    fn run(&mut self) -> BackendResult<()>;
}

/// A null backend that always returns errors (used when no engine is connected)
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    fn unavailable<T>() -> BackendResult<T> {
        Err(BackendError::Unavailable(
            "No geometry backend connected".into(),
        ))
    }
}

impl GeometryBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn set_parameter(&mut self, _name: &str, _value: &str) -> BackendResult<()> {
        Self::unavailable()
    }

    fn evaluate_numeric(&self, _expr: &str) -> BackendResult<f64> {
        Self::unavailable()
    }

    fn create_feature(
        &mut self,
        _plane: Plane,
        _name: &str,
        _kind: FeatureKind,
        _params: &[(&str, ParamValue)],
    ) -> BackendResult<FeatureHandle> {
        Self::unavailable()
    }

    fn find_feature(&self, _plane: Plane, _name: &str) -> BackendResult<FeatureHandle> {
        Self::unavailable()
    }

    fn set_property(
        &mut self,
        _handle: FeatureHandle,
        _key: &str,
        _value: ParamValue,
    ) -> BackendResult<()> {
        Self::unavailable()
    }

    fn select(
        &mut self,
        _handle: FeatureHandle,
        _slot: SelectionSlot,
        _target: &SelectionTarget,
    ) -> BackendResult<()> {
        Self::unavailable()
    }

    fn vertex_count(&self, _plane: Plane, _name: &str) -> BackendResult<u32> {
        Self::unavailable()
    }

    fn run(&mut self) -> BackendResult<()> {
        Self::unavailable()
    }
}
