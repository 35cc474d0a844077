//! Gradient estimation variants for Simultaneous Perturbation Stochastic Approximation (SPSA).
//!
//! The crate provides two kinds of modifications over the classic first order SPSA update:
//!
//! * Smoothing of the estimated gradient, either with a bias-corrected exponential moving average
//!   ([`MomentumGradient`]) or with an Adam-like normalization ([`AdamGradient`]).
//! * Sampling of the perturbation directions uniformly from a hypersphere
//!   ([`SphereSampledGradient`]) instead of independent random signs ([`BernoulliGradient`]).
//!
//! Every component is built around injected capabilities: the smoothers wrap any
//! [`GradientEstimator`] and the point estimators delegate the objective evaluations to a
//! [`PointSampler`]. The optimization loop itself (gains, calibration and termination) is left to
//! the caller.

mod builder;
pub mod error;
pub mod estimation;
mod loss;
pub mod smoothing;
pub mod specs;

pub use builder::EstimatorBuilder;
pub use error::{Result, SpsaErr};
pub use estimation::{
    BernoulliGradient, GradientEstimator, PointEstimate, PointEstimator, PointSampler,
    Resamplings, SphereSampledGradient, Spsa, TwoPointSampler,
};
pub use loss::Loss;
pub use smoothing::{AdamGradient, MomentumGradient};
