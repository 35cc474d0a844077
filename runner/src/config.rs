use std::{fs, num::NonZeroUsize, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use spsa::specs::EstimatorSpec;

/// The specification for the objective to minimize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSpec {
    Quadratic { center: Vec<f64> },
    Rosenbrock,
}

/// Immutable description of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    pub estimator: EstimatorSpec,
    pub objective: ObjectiveSpec,
    pub initial_point: Vec<f64>,
    pub iterations: NonZeroUsize,
    pub learning_rate: f64,
    pub perturbation: f64,
}

impl RunSpec {
    /// Reads a run specification from a json file.
    ///
    /// # Args
    /// * `path` - The path of the file.
    ///
    /// # Returns
    /// The parsed spec or an error if the file can't be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}
