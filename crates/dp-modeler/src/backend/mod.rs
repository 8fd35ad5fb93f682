//! Geometry backend abstraction
//!
//! The modeler drives any engine implementing [`GeometryBackend`]. Two
//! backends ship with the crate: [`NullBackend`] for when nothing is
//! connected and [`RecordingBackend`] for dry runs and tests.

mod recording;
mod traits;

pub use recording::{BackendCall, RecordedFeature, RecordingBackend};
pub use traits::{
    BackendError, BackendResult, FeatureHandle, FeatureKind, GeometryBackend, NullBackend,
    ParamValue, SelectionSlot, SelectionTarget,
};
