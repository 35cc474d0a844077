use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    estimation::Resamplings,
    smoothing::{DEFAULT_DECAY, DEFAULT_DECAY1, DEFAULT_DECAY2, DEFAULT_EPSILON},
};

/// The specification for the way perturbation directions are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingSpec {
    Bernoulli {
        #[serde(default)]
        perturbation_dims: Option<NonZeroUsize>,
    },
    Sphere,
}

/// The specification for the smoothing applied on top of the raw gradient estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingSpec {
    None,
    Momentum {
        #[serde(default = "default_decay")]
        decay: f64,
    },
    Adam {
        #[serde(default = "default_decay1")]
        decay1: f64,
        #[serde(default = "default_decay2")]
        decay2: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
}

/// The specification for a `GradientEstimator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSpec {
    pub sampling: SamplingSpec,
    #[serde(default = "default_smoothing")]
    pub smoothing: SmoothingSpec,
    #[serde(default)]
    pub resamplings: Resamplings,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_decay() -> f64 {
    DEFAULT_DECAY
}

fn default_decay1() -> f64 {
    DEFAULT_DECAY1
}

fn default_decay2() -> f64 {
    DEFAULT_DECAY2
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_smoothing() -> SmoothingSpec {
    SmoothingSpec::None
}
