use std::num::NonZeroUsize;

use log::trace;
use ndarray::{Array1, ArrayView1};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use super::{Accumulator, PointEstimate, PointEstimator, PointSampler};
use crate::{Loss, Result, SpsaErr};

/// Draws a direction uniformly distributed on the sphere of radius `sqrt(dim)`.
///
/// The radius matches the norm of a random sign vector, so the two-point arithmetic keeps the
/// same scale whichever sampling strategy is used.
///
/// # Arguments
/// * `dim` - The dimensionality of the direction, must be positive.
/// * `rng` - The random source.
///
/// # Returns
/// The direction or an error if `dim` is zero.
pub fn sample_sphere<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Result<Array1<f64>> {
    if dim == 0 {
        return Err(SpsaErr::EmptyPoint);
    }

    loop {
        let mut mu = Array1::<f64>::random_using(dim, StandardNormal, rng);
        let norm = mu.dot(&mu).sqrt();

        // A draw of exact zeros has no direction.
        if norm > 0. {
            mu /= norm;
            return Ok(mu * (dim as f64).sqrt());
        }
    }
}

/// A point estimator that samples its directions uniformly from a hypersphere instead of using
/// independent random signs per coordinate.
///
/// Only first order estimates are produced, the returned Hessian is always `None`.
pub struct SphereSampledGradient<S: PointSampler, R: Rng> {
    sampler: S,
    rng: R,
}

impl<S: PointSampler, R: Rng> SphereSampledGradient<S, R> {
    /// Creates a new `SphereSampledGradient` estimator.
    ///
    /// # Arguments
    /// * `sampler` - The sampler evaluating the objective along each direction.
    /// * `rng` - The source of the normal draws.
    pub fn new(sampler: S, rng: R) -> Self {
        Self { sampler, rng }
    }

    /// Returns a reference to the underlying sampler.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

impl<S: PointSampler, R: Rng> PointEstimator for SphereSampledGradient<S, R> {
    fn point_estimate(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        eps: f64,
        num_samples: NonZeroUsize,
    ) -> Result<PointEstimate> {
        let dim = x.len();
        let deltas = (0..num_samples.get())
            .map(|_| sample_sphere(dim, &mut self.rng))
            .collect::<Result<Vec<_>>>()?;

        let mut acc = Accumulator::new(dim);
        for delta in &deltas {
            let sample = self.sampler.point_sample(loss, x, eps, delta.view())?;
            acc.add(&sample)?;
        }

        trace!(samples = num_samples.get(); "sphere point estimate");
        Ok(acc.finish())
    }
}
