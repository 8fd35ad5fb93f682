//! Expression Translation
//!
//! Converts client-side values and symbolic expressions into the backend's
//! literal syntax: quantities get bracketed units (`25um` becomes `25[um]`)
//! and the power operator `**` becomes `^`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Translates client values into backend literals
pub trait ExpressionTranslator {
    /// Convert a value or expression into backend syntax
    fn to_backend_literal(&self, value: &str) -> String;
}

/// Units recognized after a number by default
pub const DEFAULT_UNITS: &[&str] = &["m", "cm", "mm", "um", "nm", "pm", "deg", "rad"];

/// Translator that brackets known units and rewrites the power operator
#[derive(Debug, Clone)]
pub struct BracketUnits {
    /// Unit suffixes to bracket
    units: Vec<String>,
}

impl Default for BracketUnits {
    fn default() -> Self {
        Self::new(DEFAULT_UNITS.iter().copied())
    }
}

impl BracketUnits {
    /// Create a translator recognizing the given units
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
        }
    }

    fn is_unit(&self, word: &str) -> bool {
        self.units.iter().any(|u| u == word)
    }
}

/// A number (optional fraction and exponent) directly followed by a word
static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+\.?\d*(?:[eE][+-]?\d+)?)([A-Za-z]+)\b")
        .expect("quantity pattern is valid")
});

impl ExpressionTranslator for BracketUnits {
    fn to_backend_literal(&self, value: &str) -> String {
        let value = value.trim().replace("**", "^");
        QUANTITY
            .replace_all(&value, |caps: &Captures<'_>| {
                if self.is_unit(&caps[2]) {
                    format!("{}[{}]", &caps[1], &caps[2])
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}
