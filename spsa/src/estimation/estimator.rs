use std::num::NonZeroUsize;

use ndarray::{Array1, Array2, ArrayView1};

use crate::{Loss, Result, error::check_size};

/// The outcome of evaluating the objective around a point.
#[derive(Debug, Clone)]
pub struct PointEstimate {
    pub value: f64,
    pub gradient: Array1<f64>,
    pub hessian: Option<Array2<f64>>,
}

/// Turns a single perturbation direction into a sample of the objective's value and gradient.
pub trait PointSampler {
    /// Samples the objective around `x` along `delta`.
    ///
    /// # Arguments
    /// * `loss` - The objective.
    /// * `x` - The current point.
    /// * `eps` - The perturbation scale.
    /// * `delta` - The perturbation direction, it must have the same length as `x`.
    ///
    /// # Returns
    /// The sample or an error if the objective failed or the sizes don't match.
    fn point_sample(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        eps: f64,
        delta: ArrayView1<f64>,
    ) -> Result<PointEstimate>;
}

/// Estimates the objective's value and gradient at a point by averaging several samples.
pub trait PointEstimator {
    /// Estimates the objective at `x` using `num_samples` random directions.
    ///
    /// # Arguments
    /// * `loss` - The objective.
    /// * `x` - The current point.
    /// * `eps` - The perturbation scale.
    /// * `num_samples` - The amount of directions to average over.
    ///
    /// # Returns
    /// The averaged estimate or the first error encountered.
    fn point_estimate(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        eps: f64,
        num_samples: NonZeroUsize,
    ) -> Result<PointEstimate>;
}

/// Produces the update direction consumed by the optimization loop, once per iteration.
pub trait GradientEstimator {
    /// Computes the value of the objective and the update direction at `x`.
    ///
    /// # Arguments
    /// * `loss` - The objective.
    /// * `x` - The current point.
    /// * `k` - The iteration index.
    /// * `eps` - The perturbation scale for this iteration.
    ///
    /// # Returns
    /// A `(value, direction)` pair or the first error encountered.
    fn compute_update(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        k: usize,
        eps: f64,
    ) -> Result<(f64, Array1<f64>)>;
}

impl<E: GradientEstimator + ?Sized> GradientEstimator for Box<E> {
    fn compute_update(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        k: usize,
        eps: f64,
    ) -> Result<(f64, Array1<f64>)> {
        (**self).compute_update(loss, x, k, eps)
    }
}

/// Running sums of point samples, averaged arithmetically on `finish`.
#[derive(Debug)]
pub(crate) struct Accumulator {
    value: f64,
    gradient: Array1<f64>,
    count: usize,
}

impl Accumulator {
    pub(crate) fn new(dim: usize) -> Self {
        Self {
            value: 0.,
            gradient: Array1::zeros(dim),
            count: 0,
        }
    }

    pub(crate) fn add(&mut self, sample: &PointEstimate) -> Result<()> {
        check_size(
            "gradient sample",
            "gradient estimate",
            sample.gradient.len(),
            self.gradient.len(),
        )?;

        self.value += sample.value;
        self.gradient += &sample.gradient;
        self.count += 1;
        Ok(())
    }

    /// Averages the accumulated samples, the Hessian is never estimated.
    pub(crate) fn finish(self) -> PointEstimate {
        let n = self.count.max(1) as f64;

        PointEstimate {
            value: self.value / n,
            gradient: self.gradient / n,
            hessian: None,
        }
    }
}
