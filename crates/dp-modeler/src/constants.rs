//! Modeler constants

/// Selection that perfect-E geometry contributes to
pub const PEC_SELECTION: &str = "pec_sel";

/// Prefix of the feature that deletes an entity
pub const DELETE_PREFIX: &str = "del_";

/// Current draw script format version
pub const SCRIPT_VERSION: u32 = 1;
