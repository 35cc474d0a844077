use std::{collections::HashMap, num::NonZeroUsize};

use log::debug;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{GradientEstimator, PointEstimator};
use crate::{Loss, Result};

/// How many directions are averaged at each iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resamplings {
    /// The same amount at every iteration.
    Fixed(NonZeroUsize),
    /// An amount per iteration index, iterations missing from the map use a single sample.
    Schedule(HashMap<usize, NonZeroUsize>),
}

impl Resamplings {
    /// Returns the amount of samples to use at iteration `k`.
    pub fn at(&self, k: usize) -> NonZeroUsize {
        match self {
            Resamplings::Fixed(n) => *n,
            Resamplings::Schedule(schedule) => {
                schedule.get(&k).copied().unwrap_or(NonZeroUsize::MIN)
            }
        }
    }
}

impl Default for Resamplings {
    fn default() -> Self {
        Self::Fixed(NonZeroUsize::MIN)
    }
}

/// The first order SPSA update: a point estimate averaged over the iteration's resamplings.
pub struct Spsa<P: PointEstimator> {
    estimator: P,
    resamplings: Resamplings,
}

impl<P: PointEstimator> Spsa<P> {
    /// Creates a new `Spsa` update.
    ///
    /// # Arguments
    /// * `estimator` - The point estimator, which decides how directions are drawn.
    /// * `resamplings` - The amount of directions to average at each iteration.
    pub fn new(estimator: P, resamplings: Resamplings) -> Self {
        Self {
            estimator,
            resamplings,
        }
    }

    /// Returns a reference to the underlying point estimator.
    pub fn estimator(&self) -> &P {
        &self.estimator
    }
}

impl<P: PointEstimator> GradientEstimator for Spsa<P> {
    fn compute_update(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        k: usize,
        eps: f64,
    ) -> Result<(f64, Array1<f64>)> {
        let num_samples = self.resamplings.at(k);
        let estimate = self.estimator.point_estimate(loss, x, eps, num_samples)?;

        debug!(iteration = k, samples = num_samples.get(), value = estimate.value; "spsa update");
        Ok((estimate.value, estimate.gradient))
    }
}
