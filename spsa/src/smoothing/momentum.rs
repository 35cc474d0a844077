use log::debug;
use ndarray::{Array1, ArrayView1};

use super::{DEFAULT_DECAY, bias_correction};
use crate::{
    GradientEstimator, Loss, Result,
    error::{check_decay, check_size},
};

#[derive(Debug, Default)]
enum MomentumState {
    #[default]
    Uninitialized,
    Initialized {
        average: Array1<f64>,
        iteration: usize,
    },
}

/// Smooths the directions of an inner estimator with a bias-corrected exponential moving average.
///
/// At iteration `t` the running average is `m_t = decay * m_{t-1} + (1 - decay) * g_t`, starting from
/// zero, and the returned direction is `m_t / (1 - decay^t)`.
#[derive(Debug)]
pub struct MomentumGradient<E: GradientEstimator> {
    estimator: E,
    decay: f64,
    state: MomentumState,
}

impl<E: GradientEstimator> MomentumGradient<E> {
    /// Creates a new `MomentumGradient`.
    ///
    /// # Arguments
    /// * `estimator` - The estimator producing the raw gradients.
    /// * `decay` - The decay of the moving average.
    ///
    /// # Returns
    /// A new instance or an error if `decay` is not in (0, 1).
    pub fn new(estimator: E, decay: f64) -> Result<Self> {
        Ok(Self {
            estimator,
            decay: check_decay("decay", decay)?,
            state: MomentumState::Uninitialized,
        })
    }

    /// Creates a new `MomentumGradient` with a decay of `0.9`.
    pub fn with_defaults(estimator: E) -> Self {
        Self {
            estimator,
            decay: DEFAULT_DECAY,
            state: MomentumState::Uninitialized,
        }
    }

    /// Returns the weight kept from the previous running average on each update.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Returns the amount of gradients folded into the running average.
    pub fn iteration(&self) -> usize {
        match self.state {
            MomentumState::Uninitialized => 0,
            MomentumState::Initialized { iteration, .. } => iteration,
        }
    }

    /// Returns the running average, if any gradient has been seen yet.
    pub fn running_average(&self) -> Option<ArrayView1<f64>> {
        match &self.state {
            MomentumState::Uninitialized => None,
            MomentumState::Initialized { average, .. } => Some(average.view()),
        }
    }

    /// Forgets every gradient seen so far.
    pub fn reset(&mut self) {
        self.state = MomentumState::Uninitialized;
    }

    /// Folds `gradient` into the running average.
    ///
    /// # Arguments
    /// * `gradient` - The raw gradient of this iteration.
    ///
    /// # Returns
    /// The bias-corrected running average or an error if `gradient` doesn't have the dimensionality
    /// of the first gradient seen, in which case the state is left untouched.
    pub fn smooth(&mut self, gradient: ArrayView1<f64>) -> Result<Array1<f64>> {
        if let MomentumState::Initialized { average, .. } = &self.state {
            check_size("gradient", "running average", gradient.len(), average.len())?;
        }

        let decay = self.decay;
        let (average, iteration) = match std::mem::take(&mut self.state) {
            MomentumState::Uninitialized => (&gradient * (1. - decay), 1),
            MomentumState::Initialized { average, iteration } => {
                (average * decay + &gradient * (1. - decay), iteration + 1)
            }
        };

        let direction = &average / bias_correction(decay, iteration);
        debug!(iteration = iteration; "momentum update");

        self.state = MomentumState::Initialized { average, iteration };
        Ok(direction)
    }
}

impl<E: GradientEstimator> GradientEstimator for MomentumGradient<E> {
    fn compute_update(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        k: usize,
        eps: f64,
    ) -> Result<(f64, Array1<f64>)> {
        let (value, gradient) = self.estimator.compute_update(loss, x, k, eps)?;
        let direction = self.smooth(gradient.view())?;
        Ok((value, direction))
    }
}
