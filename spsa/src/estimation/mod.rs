mod bernoulli;
mod estimator;
mod sampler;
mod sphere;
mod spsa;

pub use bernoulli::BernoulliGradient;
pub(crate) use estimator::Accumulator;
pub use estimator::{GradientEstimator, PointEstimate, PointEstimator, PointSampler};
pub use sampler::TwoPointSampler;
pub use sphere::{SphereSampledGradient, sample_sphere};
pub use spsa::{Resamplings, Spsa};
