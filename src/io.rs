//! Model state serialization (JSON)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A named parameter with its shape and flattened data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamState {
    /// Parameter name (e.g. "slope", "weights")
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,

    /// Flattened row-major data
    pub data: Vec<f32>,
}

impl ParamState {
    /// Create a parameter snapshot
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            shape,
            data,
        }
    }
}

/// Serializable model state: the learned parameters of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model name/identifier
    pub name: String,

    /// Named parameters
    pub parameters: Vec<ParamState>,
}

impl ModelState {
    /// Create a new model state
    pub fn new(name: impl Into<String>, parameters: Vec<ParamState>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Result<&ParamState> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::Serialization(format!("missing parameter {name:?}")))
    }

    /// Save as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        let mut file = File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Load from a JSON file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))
    }
}
