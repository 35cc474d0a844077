use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    estimation::{
        BernoulliGradient, GradientEstimator, SphereSampledGradient, Spsa, TwoPointSampler,
    },
    smoothing::{AdamGradient, MomentumGradient},
    specs::{EstimatorSpec, SamplingSpec, SmoothingSpec},
};

/// Builds `GradientEstimator`s given a specification.
#[derive(Debug, Default)]
pub struct EstimatorBuilder;

impl EstimatorBuilder {
    /// Creates a new `EstimatorBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a gradient estimator following a spec.
    ///
    /// # Args
    /// * `spec` - The specification of the estimator.
    ///
    /// # Returns
    /// A new estimator or an error if a hyperparameter is invalid.
    pub fn build(&self, spec: EstimatorSpec) -> Result<Box<dyn GradientEstimator>> {
        debug!("building estimator from {spec:?}");

        let EstimatorSpec {
            sampling,
            smoothing,
            resamplings,
            seed,
        } = spec;

        let rng = self.generate_rng(seed);
        let sampler = TwoPointSampler::new();

        match sampling {
            SamplingSpec::Bernoulli { perturbation_dims } => {
                let estimator = BernoulliGradient::new(sampler, rng, perturbation_dims);
                self.resolve_smoothing(smoothing, Spsa::new(estimator, resamplings))
            }
            SamplingSpec::Sphere => {
                let estimator = SphereSampledGradient::new(sampler, rng);
                self.resolve_smoothing(smoothing, Spsa::new(estimator, resamplings))
            }
        }
    }

    /// Generates a random number generator given (or not) a seed.
    ///
    /// # Args
    /// * `seed` - An optional seed for the rng.
    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Wraps the base estimator with the smoothing of the spec.
    ///
    /// # Args
    /// * `spec` - The smoothing specification.
    /// * `estimator` - The resolved base estimator.
    ///
    /// # Returns
    /// The boxed estimator or an error if a hyperparameter is invalid.
    fn resolve_smoothing<E>(
        &self,
        spec: SmoothingSpec,
        estimator: E,
    ) -> Result<Box<dyn GradientEstimator>>
    where
        E: GradientEstimator + 'static,
    {
        let estimator: Box<dyn GradientEstimator> = match spec {
            SmoothingSpec::None => Box::new(estimator),
            SmoothingSpec::Momentum { decay } => Box::new(MomentumGradient::new(estimator, decay)?),
            SmoothingSpec::Adam {
                decay1,
                decay2,
                epsilon,
            } => Box::new(AdamGradient::new(estimator, decay1, decay2, epsilon)?),
        };

        Ok(estimator)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayView1, array};

    use super::*;
    use crate::{SpsaErr, estimation::Resamplings};

    fn spec(sampling: SamplingSpec, smoothing: SmoothingSpec) -> EstimatorSpec {
        EstimatorSpec {
            sampling,
            smoothing,
            resamplings: Resamplings::default(),
            seed: Some(42),
        }
    }

    #[test]
    fn builds_every_combination() {
        let samplings = [
            SamplingSpec::Bernoulli {
                perturbation_dims: None,
            },
            SamplingSpec::Sphere,
        ];
        let smoothings = [
            SmoothingSpec::None,
            SmoothingSpec::Momentum { decay: 0.9 },
            SmoothingSpec::Adam {
                decay1: 0.9,
                decay2: 0.999,
                epsilon: 1e-8,
            },
        ];

        let mut loss: fn(ArrayView1<f64>) -> f64 = |x| x.dot(&x);
        let x = array![1., 2., 3.];

        for sampling in samplings {
            for smoothing in smoothings {
                let mut estimator = EstimatorBuilder::new().build(spec(sampling, smoothing)).unwrap();
                let (value, direction) = estimator
                    .compute_update(&mut loss, x.view(), 0, 0.01)
                    .unwrap();

                assert!((value - 14.).abs() < 1e-2);
                assert_eq!(direction.len(), 3);
            }
        }
    }

    #[test]
    fn rejects_invalid_decay() {
        let err = EstimatorBuilder::new()
            .build(spec(SamplingSpec::Sphere, SmoothingSpec::Momentum { decay: 1. }))
            .err()
            .unwrap();

        assert!(matches!(err, SpsaErr::InvalidHyperparameter { name: "decay", .. }));
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let mut loss: fn(ArrayView1<f64>) -> f64 = |x| x.mapv(f64::cos).sum();
        let x = array![0.1, 0.2, 0.3, 0.4];
        let spec = spec(SamplingSpec::Sphere, SmoothingSpec::Momentum { decay: 0.9 });

        let mut a = EstimatorBuilder::new().build(spec.clone()).unwrap();
        let mut b = EstimatorBuilder::new().build(spec).unwrap();

        for k in 0..5 {
            let (_, da) = a.compute_update(&mut loss, x.view(), k, 0.1).unwrap();
            let (_, db) = b.compute_update(&mut loss, x.view(), k, 0.1).unwrap();
            assert_eq!(da, db);
        }
    }
}
