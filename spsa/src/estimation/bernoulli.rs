use std::num::NonZeroUsize;

use log::trace;
use ndarray::{Array1, ArrayView1};
use rand::{Rng, seq::index};

use super::{Accumulator, PointEstimate, PointEstimator, PointSampler};
use crate::{Loss, Result, SpsaErr};

/// The classic SPSA point estimator, every coordinate of a direction is an independent random sign.
pub struct BernoulliGradient<S: PointSampler, R: Rng> {
    sampler: S,
    rng: R,
    perturbation_dims: Option<NonZeroUsize>,
}

impl<S: PointSampler, R: Rng> BernoulliGradient<S, R> {
    /// Creates a new `BernoulliGradient` estimator.
    ///
    /// # Arguments
    /// * `sampler` - The sampler evaluating the objective along each direction.
    /// * `rng` - The source of the random signs.
    /// * `perturbation_dims` - If set, only this many randomly chosen coordinates are perturbed
    ///   in each direction and the rest are left at zero.
    pub fn new(sampler: S, rng: R, perturbation_dims: Option<NonZeroUsize>) -> Self {
        Self {
            sampler,
            rng,
            perturbation_dims,
        }
    }

    /// Returns a reference to the underlying sampler.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Draws a single direction of random signs.
    ///
    /// # Arguments
    /// * `dim` - The dimensionality of the direction.
    ///
    /// # Returns
    /// The direction or an error if more coordinates than `dim` should be perturbed.
    fn perturbation(&mut self, dim: usize) -> Result<Array1<f64>> {
        let mut delta =
            Array1::from_shape_fn(dim, |_| if self.rng.random_bool(0.5) { -1. } else { 1. });

        if let Some(pdims) = self.perturbation_dims {
            let pdims = pdims.get();
            if pdims > dim {
                return Err(SpsaErr::InvalidHyperparameter {
                    name: "perturbation_dims",
                    value: pdims as f64,
                });
            }

            for i in index::sample(&mut self.rng, dim, dim - pdims) {
                delta[i] = 0.;
            }
        }

        Ok(delta)
    }
}

impl<S: PointSampler, R: Rng> PointEstimator for BernoulliGradient<S, R> {
    fn point_estimate(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        eps: f64,
        num_samples: NonZeroUsize,
    ) -> Result<PointEstimate> {
        let dim = x.len();
        let deltas = (0..num_samples.get())
            .map(|_| self.perturbation(dim))
            .collect::<Result<Vec<_>>>()?;

        let mut acc = Accumulator::new(dim);
        for delta in &deltas {
            let sample = self.sampler.point_sample(loss, x, eps, delta.view())?;
            acc.add(&sample)?;
        }

        trace!(samples = num_samples.get(); "bernoulli point estimate");
        Ok(acc.finish())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::estimation::TwoPointSampler;

    fn estimator(pdims: Option<usize>) -> BernoulliGradient<TwoPointSampler, StdRng> {
        BernoulliGradient::new(
            TwoPointSampler::new(),
            StdRng::seed_from_u64(42),
            pdims.and_then(NonZeroUsize::new),
        )
    }

    #[test]
    fn directions_are_signs() {
        let mut est = estimator(None);
        let delta = est.perturbation(64).unwrap();

        assert!(delta.iter().all(|d| *d == 1. || *d == -1.));
    }

    #[test]
    fn perturbation_dims_zeroes_the_rest() {
        let mut est = estimator(Some(3));

        for _ in 0..10 {
            let delta = est.perturbation(8).unwrap();
            let nonzero = delta.iter().filter(|d| **d != 0.).count();
            assert_eq!(nonzero, 3);
        }
    }

    #[test]
    fn too_many_perturbation_dims() {
        let mut est = estimator(Some(5));
        assert!(est.perturbation(4).is_err());
    }

    #[test]
    fn quadratic_gradient_is_recovered_on_average() {
        // f(x) = |x|^2, gradient 2x. Each sample is (d . 2x) d, whose mean over signs is 2x.
        let mut loss: fn(ArrayView1<f64>) -> f64 = |x| x.dot(&x);
        let x = array![1., -0.5];

        let mut est = estimator(None);
        let samples = NonZeroUsize::new(4000).unwrap();
        let estimate = est
            .point_estimate(&mut loss, x.view(), 0.01, samples)
            .unwrap();

        assert!((estimate.gradient[0] - 2.).abs() < 0.1);
        assert!((estimate.gradient[1] + 1.).abs() < 0.1);
        assert_eq!(est.sampler().nfev(), 8000);
    }
}
