//! Draw Scripts
//!
//! A draw script is a named, ordered list of drawing commands together with
//! the options to replay them with. Scripts are stored as RON.

use std::path::Path;

use dp_core::{DeleteStatus, EntityId, Layer, Mutation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::GeometryBackend;
use crate::constants::SCRIPT_VERSION;
use crate::expr::ExpressionTranslator;
use crate::modeler::{Modeler, ModelerError, ModelerResult};
use crate::options::ModelerOptions;

/// A single drawing command
///
/// Entities are referred to by their base names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    SetVariable {
        name: String,
        value: String,
    },
    Rect {
        name: String,
        layer: Layer,
        pos: [String; 2],
        size: [String; 2],
        /// `pos` is the center instead of the corner
        #[serde(default)]
        centered: bool,
    },
    Box {
        name: String,
        layer: Layer,
        pos: [String; 3],
        size: [String; 3],
        #[serde(default)]
        centered: bool,
    },
    Polygon {
        name: String,
        layer: Layer,
        points: Vec<[String; 2]>,
        #[serde(default = "closed_by_default")]
        closed: bool,
    },
    /// Trace of constant width along a filleted path
    SweepAlongPath {
        name: String,
        layer: Layer,
        points: Vec<[String; 2]>,
        port_ori: [String; 2],
        port_pos: [String; 2],
        width: String,
        fillet_radius: String,
    },
    Translate {
        entities: Vec<String>,
        vector: [String; 3],
    },
    Rotate {
        entities: Vec<String>,
        angle: String,
        #[serde(default)]
        center: Option<[String; 2]>,
    },
    Fillet {
        entity: String,
        radius: String,
        /// 1-based vertex indices, all vertices if unset
        #[serde(default)]
        vertices: Option<Vec<u32>>,
    },
    Unite {
        entities: Vec<String>,
        #[serde(default)]
        keep_originals: bool,
    },
    Subtract {
        blanks: Vec<String>,
        tools: Vec<String>,
        #[serde(default)]
        keep_originals: bool,
    },
    Delete {
        entity: String,
    },
    AssignPerfectE {
        entities: Vec<String>,
    },
    /// Commit the backend feature tree
    Run,
}

fn closed_by_default() -> bool {
    true
}

/// What replaying one command amounted to
enum Step {
    Done,
    /// Number of entity mutations skipped because the entity was deleted
    Skipped(usize),
    AlreadyDeleted,
}

impl DrawCommand {
    /// Execute the command against a modeler
    fn execute<B: GeometryBackend, T: ExpressionTranslator>(
        &self,
        modeler: &mut Modeler<B, T>,
    ) -> ModelerResult<Step> {
        match self {
            DrawCommand::SetVariable { name, value } => {
                modeler.set_variable(name, value)?;
            }
            DrawCommand::Rect {
                name,
                layer,
                pos,
                size,
                centered,
            } => {
                let pos = pos.each_ref().map(String::as_str);
                let size = size.each_ref().map(String::as_str);
                if *centered {
                    modeler.rect_center(name, *layer, pos, size)?;
                } else {
                    modeler.rect(name, *layer, pos, size)?;
                }
            }
            DrawCommand::Box {
                name,
                layer,
                pos,
                size,
                centered,
            } => {
                let pos = pos.each_ref().map(String::as_str);
                let size = size.each_ref().map(String::as_str);
                if *centered {
                    modeler.block_center(name, *layer, pos, size)?;
                } else {
                    modeler.block(name, *layer, pos, size)?;
                }
            }
            DrawCommand::Polygon {
                name,
                layer,
                points,
                closed,
            } => {
                let points: Vec<[&str; 2]> = points
                    .iter()
                    .map(|p| p.each_ref().map(String::as_str))
                    .collect();
                modeler.polygon(name, *layer, &points, *closed)?;
            }
            DrawCommand::SweepAlongPath {
                name,
                layer,
                points,
                port_ori,
                port_pos,
                width,
                fillet_radius,
            } => {
                let points: Vec<[&str; 2]> = points
                    .iter()
                    .map(|p| p.each_ref().map(String::as_str))
                    .collect();
                modeler.sweep_along_path(
                    name,
                    *layer,
                    &points,
                    port_ori.each_ref().map(String::as_str),
                    port_pos.each_ref().map(String::as_str),
                    width,
                    fillet_radius,
                )?;
            }
            DrawCommand::Translate { entities, vector } => {
                let ids = entity_ids(entities)?;
                let results = modeler.translate(&ids, vector.each_ref().map(String::as_str))?;
                return Ok(skipped(results.iter().map(|(_, m)| m)));
            }
            DrawCommand::Rotate {
                entities,
                angle,
                center,
            } => {
                let ids = entity_ids(entities)?;
                let center = center.as_ref().map(|c| c.each_ref().map(String::as_str));
                let results = modeler.rotate(&ids, angle, center)?;
                return Ok(skipped(results.iter().map(|(_, m)| m)));
            }
            DrawCommand::Fillet {
                entity,
                radius,
                vertices,
            } => {
                let id = EntityId::new(entity.as_str())?;
                let result = modeler.fillet(&id, radius, vertices.as_deref())?;
                return Ok(skipped([&result]));
            }
            DrawCommand::Unite {
                entities,
                keep_originals,
            } => {
                let ids = entity_ids(entities)?;
                let outcome = modeler.unite(&ids, *keep_originals)?;
                if outcome.result.is_skipped() {
                    return Ok(Step::Skipped(outcome.skipped.len()));
                }
            }
            DrawCommand::Subtract {
                blanks,
                tools,
                keep_originals,
            } => {
                let blanks = entity_ids(blanks)?;
                let tools = entity_ids(tools)?;
                let outcome = modeler.subtract(&blanks, &tools, *keep_originals)?;
                return Ok(skipped(outcome.results.iter().map(|(_, m)| m)));
            }
            DrawCommand::Delete { entity } => {
                let id = EntityId::new(entity.as_str())?;
                if modeler.delete(&id)? == DeleteStatus::AlreadyDeleted {
                    return Ok(Step::AlreadyDeleted);
                }
            }
            DrawCommand::AssignPerfectE { entities } => {
                let ids = entity_ids(entities)?;
                let assigned = modeler.assign_perfect_e(&ids)?;
                if assigned.len() < ids.len() {
                    return Ok(Step::Skipped(ids.len() - assigned.len()));
                }
            }
            DrawCommand::Run => modeler.run()?,
        }
        Ok(Step::Done)
    }
}

fn entity_ids(names: &[String]) -> ModelerResult<Vec<EntityId>> {
    let ids = names
        .iter()
        .map(|name| EntityId::new(name.as_str()))
        .collect::<Result<_, _>>()?;
    Ok(ids)
}

fn skipped<'a>(mutations: impl IntoIterator<Item = &'a Mutation>) -> Step {
    match mutations.into_iter().filter(|m| m.is_skipped()).count() {
        0 => Step::Done,
        n => Step::Skipped(n),
    }
}

/// Summary of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Commands executed
    pub executed: usize,
    /// Entity operations skipped because the entity was deleted
    pub skipped: usize,
    /// Deletions of entities that were already deleted
    pub already_deleted: usize,
}

/// Serializable draw script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawScript {
    /// File format version
    pub version: u32,
    /// Script name
    pub name: String,
    /// Options to replay with
    #[serde(default)]
    pub options: ModelerOptions,
    /// Commands in execution order
    pub commands: Vec<DrawCommand>,
}

impl Default for DrawScript {
    fn default() -> Self {
        Self::new("New Script")
    }
}

impl DrawScript {
    /// Create a new empty script
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCRIPT_VERSION,
            name: name.into(),
            options: ModelerOptions::default(),
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Save script to a file
    pub fn save(&self, path: impl AsRef<Path>) -> ScriptResult<()> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        std::fs::write(path, content).map_err(|e| ScriptError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize script to bytes
    pub fn to_bytes(&self) -> ScriptResult<Vec<u8>> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ScriptError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load script from a file
    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        Self::parse(&content)
    }

    /// Load script from bytes
    pub fn load_from_bytes(data: &[u8]) -> ScriptResult<Self> {
        let content =
            std::str::from_utf8(data).map_err(|e| ScriptError::Deserialize(e.to_string()))?;
        Self::parse(content)
    }

    fn parse(content: &str) -> ScriptResult<Self> {
        let script: DrawScript =
            ron::from_str(content).map_err(|e| ScriptError::Deserialize(e.to_string()))?;
        if script.version > SCRIPT_VERSION {
            return Err(ScriptError::Deserialize(format!(
                "unsupported script version {} (newest known is {})",
                script.version, SCRIPT_VERSION
            )));
        }
        Ok(script)
    }

    /// Create a modeler configured with this script's options
    pub fn modeler<B: GeometryBackend>(&self, backend: B) -> Modeler<B> {
        Modeler::with_options(backend, self.options.clone())
    }

    /// Replay every command in order
    ///
    /// Stops at the first failing command. Commands before it stay applied.
    pub fn replay<B: GeometryBackend, T: ExpressionTranslator>(
        &self,
        modeler: &mut Modeler<B, T>,
    ) -> ScriptResult<ReplayReport> {
        let mut report = ReplayReport::default();
        for (index, command) in self.commands.iter().enumerate() {
            let step = command
                .execute(modeler)
                .map_err(|source| ScriptError::Command { index, source })?;
            report.executed += 1;
            match step {
                Step::Done => {}
                Step::Skipped(n) => report.skipped += n,
                Step::AlreadyDeleted => report.already_deleted += 1,
            }
        }
        tracing::info!(
            "Replayed '{}': {} commands, {} skipped, {} repeated deletions",
            self.name,
            report.executed,
            report.skipped,
            report.already_deleted
        );
        Ok(report)
    }
}

/// Script-related errors
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Command {index} failed: {source}")]
    Command {
        index: usize,
        #[source]
        source: ModelerError,
    },
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;
