//! DrawPy Modeler
//!
//! Drawing operations against an external geometry backend. The
//! [`Modeler`] keeps the lineage, plane and deletion bookkeeping the backend
//! cannot be asked about, and forwards every operation under the right
//! versioned names.

pub mod backend;
pub mod constants;
pub mod expr;
pub mod history;
pub mod modeler;
pub mod options;
pub mod script;

pub use backend::{
    BackendError, BackendResult, FeatureHandle, FeatureKind, GeometryBackend, NullBackend,
    RecordingBackend,
};
pub use expr::{BracketUnits, ExpressionTranslator};
pub use history::{HistoryEntry, OperationHistory, OperationKind};
pub use modeler::{Modeler, ModelerError, ModelerResult, SubtractOutcome, UniteOutcome};
pub use options::ModelerOptions;
pub use script::{DrawCommand, DrawScript, ReplayReport, ScriptError, ScriptResult};
