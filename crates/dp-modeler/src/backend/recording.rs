//! Recording Backend
//!
//! In-memory backend that keeps the feature tree it is asked to build
//! instead of driving a real engine. Used for dry runs and tests.
//!
//! Expressions are evaluated with `+ - * / ^`, parentheses, parameter
//! names and numbers with an optional bracketed unit (`25[um]`).

use std::collections::HashMap;

use dp_core::Plane;
use serde::{Deserialize, Serialize};

use super::{
    BackendError, BackendResult, FeatureHandle, FeatureKind, GeometryBackend, ParamValue,
    SelectionSlot, SelectionTarget,
};

/// Maximum parameter indirection followed during evaluation
const MAX_PARAMETER_DEPTH: usize = 16;

/// A feature as recorded by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFeature {
    /// Handle given out at creation
    pub handle: FeatureHandle,
    /// Workplane holding the feature
    pub plane: Plane,
    /// Feature name
    pub name: String,
    /// Feature type
    pub kind: FeatureKind,
    /// Properties in the order they were set
    pub properties: Vec<(String, ParamValue)>,
    /// Selections in the order they were made
    pub selections: Vec<(SelectionSlot, SelectionTarget)>,
    /// Vertex count of the produced object, when known
    pub vertices: Option<u32>,
}

impl RecordedFeature {
    /// Get the last value set for a property
    pub fn property(&self, key: &str) -> Option<&ParamValue> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get the last target selected into a slot
    pub fn selection(&self, slot: SelectionSlot) -> Option<&SelectionTarget> {
        self.selections
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, t)| t)
    }
}

/// A call received by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendCall {
    SetParameter { name: String, value: String },
    CreateFeature { plane: Plane, name: String, kind: FeatureKind },
    SetProperty { feature: String, key: String },
    Select { feature: String, slot: SelectionSlot },
    Run,
}

/// Backend that records the feature tree in memory
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Parameter table
    parameters: HashMap<String, String>,
    /// Features in creation order
    features: Vec<RecordedFeature>,
    /// (plane, name) to feature index
    by_name: HashMap<(Plane, String), usize>,
    /// Handle to feature index
    by_handle: HashMap<FeatureHandle, usize>,
    /// Every call, in order
    calls: Vec<BackendCall>,
    /// Feature kind that is rejected on creation (failure injection)
    reject_kind: Option<FeatureKind>,
    /// Feature name that is rejected on creation (failure injection)
    reject_name: Option<String>,
    /// Number of upcoming selections that fail (failure injection)
    failing_selects: usize,
    /// Number of commits
    runs: usize,
}

impl RecordingBackend {
    /// Create an empty recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every feature of the given kind
    pub fn rejecting(mut self, kind: FeatureKind) -> Self {
        self.reject_kind = Some(kind);
        self
    }

    /// Reject the feature with the given name
    pub fn rejecting_name(mut self, name: impl Into<String>) -> Self {
        self.reject_name = Some(name.into());
        self
    }

    /// Fail the next `count` selections as if the connection dropped
    pub fn failing_selects(mut self, count: usize) -> Self {
        self.failing_selects = count;
        self
    }

    /// Stop rejecting features
    pub fn accept_all(&mut self) {
        self.reject_kind = None;
        self.reject_name = None;
    }

    /// Get all recorded features in creation order
    pub fn features(&self) -> &[RecordedFeature] {
        &self.features
    }

    /// Get a feature by plane and name
    pub fn feature(&self, plane: Plane, name: &str) -> Option<&RecordedFeature> {
        self.by_name
            .get(&(plane, name.to_string()))
            .map(|&i| &self.features[i])
    }

    /// Get a parameter value
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Get every call received, in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Get the number of commits
    pub fn runs(&self) -> usize {
        self.runs
    }

    fn feature_mut(&mut self, handle: FeatureHandle) -> BackendResult<&mut RecordedFeature> {
        match self.by_handle.get(&handle) {
            Some(&i) => Ok(&mut self.features[i]),
            None => Err(BackendError::UnknownFeature(handle.0.to_string())),
        }
    }

    /// Vertex count a freshly drawn primitive has
    fn primitive_vertices(kind: FeatureKind, params: &[(&str, ParamValue)]) -> Option<u32> {
        match kind {
            FeatureKind::Rectangle => Some(4),
            FeatureKind::Block => Some(8),
            FeatureKind::Polygon => params.iter().find_map(|(key, value)| match value {
                ParamValue::Table(rows) if *key == "table" => u32::try_from(rows.len()).ok(),
                _ => None,
            }),
            _ => None,
        }
    }

    fn evaluate_at(&self, expr: &str, depth: usize) -> BackendResult<f64> {
        let mut evaluator = Evaluator {
            backend: self,
            src: expr,
            pos: 0,
            depth,
        };
        if depth > MAX_PARAMETER_DEPTH {
            return Err(evaluator.fail("parameter indirection too deep"));
        }
        let value = evaluator.expression()?;
        if evaluator.peek().is_some() {
            return Err(evaluator.fail("unexpected trailing input"));
        }
        Ok(value)
    }
}

/// Precedence-climbing evaluator over the parameter table
///
/// `^` binds tighter than unary minus on its left and is right
/// associative: `-2^2` is `-4`, `2^3^2` is `512`.
struct Evaluator<'a> {
    backend: &'a RecordingBackend,
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    fn fail(&self, reason: impl Into<String>) -> BackendError {
        BackendError::Evaluation {
            expr: self.src.to_string(),
            reason: reason.into(),
        }
    }

    /// Next non-blank byte, without consuming it
    fn peek(&mut self) -> Option<u8> {
        let src = self.src;
        let bytes = src.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn scan(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self.pos < src.len() && accept(src.as_bytes()[self.pos]) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn expression(&mut self) -> BackendResult<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat(b'+') {
                value += self.term()?;
            } else if self.eat(b'-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> BackendResult<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat(b'*') {
                value *= self.unary()?;
            } else if self.eat(b'/') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(self.fail("division by zero"));
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> BackendResult<f64> {
        if self.eat(b'-') {
            return self.unary().map(|v| -v);
        }
        if self.eat(b'+') {
            return self.unary();
        }
        let base = self.atom()?;
        if self.eat(b'^') {
            return Ok(base.powf(self.unary()?));
        }
        Ok(base)
    }

    fn atom(&mut self) -> BackendResult<f64> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                if !self.eat(b')') {
                    return Err(self.fail("unclosed parenthesis"));
                }
                Ok(value)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.quantity(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let name = self.scan(|b| b.is_ascii_alphanumeric() || b == b'_');
                let Some(value) = self.backend.parameters.get(name) else {
                    return Err(self.fail(format!("unknown parameter '{}'", name)));
                };
                self.backend.evaluate_at(value, self.depth + 1)
            }
            Some(_) => Err(self.fail(format!("unexpected input at {}", self.pos))),
            None => Err(self.fail("expected a value")),
        }
    }

    /// Number with optional exponent and bracketed unit
    fn quantity(&mut self) -> BackendResult<f64> {
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        self.scan(|b| b.is_ascii_digit() || b == b'.');
        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.scan(|b| b.is_ascii_digit()).is_empty() {
                self.pos = mark;
            }
        }
        let number = &src[start..self.pos];
        let value: f64 = number
            .parse()
            .map_err(|_| self.fail(format!("bad number '{}'", number)))?;

        if !self.eat(b'[') {
            return Ok(value);
        }
        let unit = self.scan(|b| b != b']').trim().to_string();
        if !self.eat(b']') {
            return Err(self.fail("unclosed unit"));
        }
        let scale = unit_scale(&unit)
            .ok_or_else(|| self.fail(format!("unknown unit '{}'", unit)))?;
        Ok(value * scale)
    }
}

/// SI scale of a length or angle unit
fn unit_scale(unit: &str) -> Option<f64> {
    let scale = match unit {
        "m" => 1.0,
        "cm" => 1e-2,
        "mm" => 1e-3,
        "um" => 1e-6,
        "nm" => 1e-9,
        "pm" => 1e-12,
        "rad" => 1.0,
        "deg" => std::f64::consts::PI / 180.0,
        _ => return None,
    };
    Some(scale)
}

impl GeometryBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> BackendResult<()> {
        self.parameters.insert(name.to_string(), value.to_string());
        self.calls.push(BackendCall::SetParameter {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn evaluate_numeric(&self, expr: &str) -> BackendResult<f64> {
        self.evaluate_at(expr, 0)
    }

    fn create_feature(
        &mut self,
        plane: Plane,
        name: &str,
        kind: FeatureKind,
        params: &[(&str, ParamValue)],
    ) -> BackendResult<FeatureHandle> {
        if self.reject_kind == Some(kind) {
            return Err(BackendError::FeatureRejected {
                name: name.to_string(),
                reason: format!("{} features are rejected", kind),
            });
        }
        if self.reject_name.as_deref() == Some(name) {
            return Err(BackendError::FeatureRejected {
                name: name.to_string(),
                reason: "name is rejected".into(),
            });
        }
        let key = (plane, name.to_string());
        if self.by_name.contains_key(&key) {
            return Err(BackendError::FeatureRejected {
                name: name.to_string(),
                reason: format!("name already used on the {} plane", plane),
            });
        }

        let handle = FeatureHandle::new();
        let index = self.features.len();
        self.features.push(RecordedFeature {
            handle,
            plane,
            name: name.to_string(),
            kind,
            properties: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            selections: Vec::new(),
            vertices: Self::primitive_vertices(kind, params),
        });
        self.by_name.insert(key, index);
        self.by_handle.insert(handle, index);
        self.calls.push(BackendCall::CreateFeature {
            plane,
            name: name.to_string(),
            kind,
        });
        Ok(handle)
    }

    fn find_feature(&self, plane: Plane, name: &str) -> BackendResult<FeatureHandle> {
        self.feature(plane, name)
            .map(|f| f.handle)
            .ok_or_else(|| BackendError::UnknownFeature(name.to_string()))
    }

    fn set_property(
        &mut self,
        handle: FeatureHandle,
        key: &str,
        value: ParamValue,
    ) -> BackendResult<()> {
        let feature = self.feature_mut(handle)?;
        feature.properties.push((key.to_string(), value));
        let name = feature.name.clone();
        self.calls.push(BackendCall::SetProperty {
            feature: name,
            key: key.to_string(),
        });
        Ok(())
    }

    fn select(
        &mut self,
        handle: FeatureHandle,
        slot: SelectionSlot,
        target: &SelectionTarget,
    ) -> BackendResult<()> {
        let index = *self
            .by_handle
            .get(&handle)
            .ok_or_else(|| BackendError::UnknownFeature(handle.0.to_string()))?;
        if self.failing_selects > 0 {
            self.failing_selects -= 1;
            return Err(BackendError::Connection("selection dropped".into()));
        }
        let plane = self.features[index].plane;

        let referenced: Vec<&str> = match target {
            SelectionTarget::Objects(names) => names.iter().map(String::as_str).collect(),
            SelectionTarget::Points { object, .. } => vec![object.as_str()],
        };
        for name in &referenced {
            if self.feature(plane, name).is_none() {
                return Err(BackendError::UnknownFeature(name.to_string()));
            }
        }

        // Single-input transforms keep the vertex count of their input
        let inherited = match (self.features[index].kind, slot, referenced.as_slice()) {
            (FeatureKind::Move | FeatureKind::Rotate, SelectionSlot::Input, [only]) => {
                self.feature(plane, only).and_then(|f| f.vertices)
            }
            (FeatureKind::Fillet, SelectionSlot::Point, [only]) => {
                self.feature(plane, only).and_then(|f| f.vertices)
            }
            _ => None,
        };

        let feature = &mut self.features[index];
        feature.selections.push((slot, target.clone()));
        if inherited.is_some() {
            feature.vertices = inherited;
        }
        let name = feature.name.clone();
        self.calls.push(BackendCall::Select {
            feature: name,
            slot,
        });
        Ok(())
    }

    fn vertex_count(&self, plane: Plane, name: &str) -> BackendResult<u32> {
        let feature = self
            .feature(plane, name)
            .ok_or_else(|| BackendError::UnknownFeature(name.to_string()))?;
        feature
            .vertices
            .ok_or_else(|| BackendError::Query(format!("vertex count of '{}' is unknown", name)))
    }

    fn run(&mut self) -> BackendResult<()> {
        self.runs += 1;
        self.calls.push(BackendCall::Run);
        Ok(())
    }
}
