use log::debug;
use ndarray::{Array1, ArrayView1};

use super::{DEFAULT_DECAY1, DEFAULT_DECAY2, DEFAULT_EPSILON, bias_correction};
use crate::{
    GradientEstimator, Loss, Result,
    error::{check_decay, check_positive, check_size},
};

#[derive(Debug, Default)]
enum AdamState {
    #[default]
    Uninitialized,
    Initialized {
        first_moment: Array1<f64>,
        second_moment: f64,
        iteration: usize,
    },
}

/// Normalizes the directions of an inner estimator the way Adam does, with a scalar second moment.
///
/// The second moment tracks the squared norm of the gradients rather than each squared component, so
/// every component of the bias-corrected first moment is divided by the same normalizer.
#[derive(Debug)]
pub struct AdamGradient<E: GradientEstimator> {
    estimator: E,
    decay1: f64,
    decay2: f64,
    epsilon: f64,
    state: AdamState,
}

impl<E: GradientEstimator> AdamGradient<E> {
    /// Creates a new `AdamGradient`.
    ///
    /// # Arguments
    /// * `estimator` - The estimator producing the raw gradients.
    /// * `decay1`, `decay2` - The decays of the first and second moments.
    /// * `epsilon` - Term added to the normalizer to avoid dividing by zero.
    ///
    /// # Returns
    /// A new instance or an error if a decay is not in (0, 1) or `epsilon` is not positive.
    pub fn new(estimator: E, decay1: f64, decay2: f64, epsilon: f64) -> Result<Self> {
        Ok(Self {
            estimator,
            decay1: check_decay("decay1", decay1)?,
            decay2: check_decay("decay2", decay2)?,
            epsilon: check_positive("epsilon", epsilon)?,
            state: AdamState::Uninitialized,
        })
    }

    /// Creates a new `AdamGradient` with decays `0.9`, `0.999` and an epsilon of `1e-8`.
    pub fn with_defaults(estimator: E) -> Self {
        Self {
            estimator,
            decay1: DEFAULT_DECAY1,
            decay2: DEFAULT_DECAY2,
            epsilon: DEFAULT_EPSILON,
            state: AdamState::Uninitialized,
        }
    }

    pub fn iteration(&self) -> usize {
        match self.state {
            AdamState::Uninitialized => 0,
            AdamState::Initialized { iteration, .. } => iteration,
        }
    }

    pub fn first_moment(&self) -> Option<ArrayView1<f64>> {
        match &self.state {
            AdamState::Uninitialized => None,
            AdamState::Initialized { first_moment, .. } => Some(first_moment.view()),
        }
    }

    pub fn second_moment(&self) -> f64 {
        match self.state {
            AdamState::Uninitialized => 0.,
            AdamState::Initialized { second_moment, .. } => second_moment,
        }
    }

    /// Returns the bias-corrected first moment, `m_hat`.
    pub fn corrected_first_moment(&self) -> Option<Array1<f64>> {
        match &self.state {
            AdamState::Uninitialized => None,
            AdamState::Initialized {
                first_moment,
                iteration,
                ..
            } => Some(first_moment / bias_correction(self.decay1, *iteration)),
        }
    }

    /// Returns the bias-corrected second moment, `v_hat`.
    pub fn corrected_second_moment(&self) -> Option<f64> {
        match self.state {
            AdamState::Uninitialized => None,
            AdamState::Initialized {
                second_moment,
                iteration,
                ..
            } => Some(second_moment / bias_correction(self.decay2, iteration)),
        }
    }

    /// Forgets every gradient seen so far.
    pub fn reset(&mut self) {
        self.state = AdamState::Uninitialized;
    }

    /// Folds `gradient` into both moments.
    ///
    /// # Arguments
    /// * `gradient` - The raw gradient of this iteration.
    ///
    /// # Returns
    /// The direction `m_hat / (sqrt(v_hat) + epsilon)` or an error if `gradient` doesn't have the
    /// dimensionality of the first gradient seen, in which case the state is left untouched.
    pub fn smooth(&mut self, gradient: ArrayView1<f64>) -> Result<Array1<f64>> {
        if let AdamState::Initialized { first_moment, .. } = &self.state {
            check_size("gradient", "first moment", gradient.len(), first_moment.len())?;
        }

        let Self {
            decay1: b1,
            decay2: b2,
            epsilon: eps,
            ..
        } = *self;

        let squared_norm = gradient.mapv(|g| g.powi(2)).sum();
        let (first_moment, second_moment, iteration) = match std::mem::take(&mut self.state) {
            AdamState::Uninitialized => (&gradient * (1. - b1), (1. - b2) * squared_norm, 1),
            AdamState::Initialized {
                first_moment,
                second_moment,
                iteration,
            } => (
                first_moment * b1 + &gradient * (1. - b1),
                b2 * second_moment + (1. - b2) * squared_norm,
                iteration + 1,
            ),
        };

        let m_hat = &first_moment / bias_correction(b1, iteration);
        let v_hat = second_moment / bias_correction(b2, iteration);
        debug!(iteration = iteration, v_hat = v_hat; "adam update");

        self.state = AdamState::Initialized {
            first_moment,
            second_moment,
            iteration,
        };

        Ok(m_hat / (v_hat.sqrt() + eps))
    }
}

impl<E: GradientEstimator> GradientEstimator for AdamGradient<E> {
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

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        SpsaErr,
        smoothing::test_utils::{Replay, assert_close, zero_loss},
    };

    fn run(adam: &mut AdamGradient<Replay>, k: usize) -> Result<(f64, Array1<f64>)> {
        let mut loss: fn(ArrayView1<f64>) -> f64 = zero_loss;
        let x = array![0., 0.];
        adam.compute_update(&mut loss, x.view(), k, 0.1)
    }

    #[test]
    fn second_moment_is_the_squared_norm_on_the_first_call() {
        let mut adam = AdamGradient::with_defaults(Replay::new([array![3., 4.]]));
        let (_, direction) = run(&mut adam, 0).unwrap();

        let v_hat = adam.corrected_second_moment().unwrap();
        assert!((v_hat - 25.).abs() < 1e-10);
        assert!((adam.second_moment() - 0.025).abs() < 1e-12);
        assert_close(direction.view(), array![0.6, 0.8].view(), 1e-8);
    }

    #[test]
    fn normalizer_is_shared_by_all_components() {
        let g = array![1., -2., 0.5, 10.];
        let mut adam = AdamGradient::with_defaults(Replay::new([g.clone()]));
        let (_, direction) = run(&mut adam, 0).unwrap();

        // Per component Adam would map every entry to about +-1.
        let ratios = &direction / &g;
        for r in ratios.iter() {
            assert!((r - ratios[0]).abs() < 1e-12);
        }
        assert!((ratios[0] - 1. / (g.dot(&g).sqrt() + 1e-8)).abs() < 1e-9);
    }

    #[test]
    fn follows_the_recurrence() {
        let gradients = [array![1., 2.], array![-1., 0.5], array![4., -3.]];
        let (b1, b2, eps) = (0.8, 0.95, 1e-6);
        let mut adam = AdamGradient::new(Replay::new(gradients.clone()), b1, b2, eps).unwrap();

        let mut m = Array1::<f64>::zeros(2);
        let mut v = 0.;
        for (t, g) in gradients.iter().enumerate() {
            let (_, direction) = run(&mut adam, t).unwrap();

            let t = t as i32 + 1;
            m = &m * b1 + g * (1. - b1);
            v = b2 * v + (1. - b2) * g.dot(g);
            let m_hat = &m / (1. - b1.powi(t));
            let v_hat = v / (1. - b2.powi(t));
            let expected = m_hat / (v_hat.sqrt() + eps);

            assert_close(direction.view(), expected.view(), 1e-12);
        }
        assert_eq!(adam.iteration(), 3);
    }

    #[test]
    fn constant_gradient_converges() {
        let g = array![0.5, -1.5];
        let mut adam = AdamGradient::with_defaults(Replay::repeat(g.clone(), 400));

        for k in 0..400 {
            run(&mut adam, k).unwrap();
        }

        let m_hat = adam.corrected_first_moment().unwrap();
        assert_close(m_hat.view(), g.view(), 1e-12);
        assert!((adam.corrected_second_moment().unwrap() - g.dot(&g)).abs() < 1e-9);
    }

    #[test]
    fn zero_gradients_do_not_drift() {
        let mut adam = AdamGradient::with_defaults(Replay::repeat(array![0., 0.], 30));

        for k in 0..30 {
            let (_, direction) = run(&mut adam, k).unwrap();
            assert_eq!(direction, array![0., 0.]);
        }
        assert_eq!(adam.first_moment().unwrap(), array![0., 0.]);
        assert_eq!(adam.second_moment(), 0.);
    }

    #[test]
    fn dimension_change_is_rejected() {
        let mut adam = AdamGradient::with_defaults(Replay::new([array![1., 1.], array![1.]]));

        run(&mut adam, 0).unwrap();
        let second_moment = adam.second_moment();
        let err = run(&mut adam, 1).unwrap_err();

        assert!(matches!(err, SpsaErr::SizeMismatch { got: 1, expected: 2, .. }));
        assert_eq!(adam.iteration(), 1);
        assert_eq!(adam.second_moment(), second_moment);
    }

    #[test]
    fn invalid_hyperparameters() {
        let cases = [
            (1., 0.999, 1e-8, "decay1"),
            (0.9, 0., 1e-8, "decay2"),
            (0.9, 0.999, 0., "epsilon"),
            (0.9, 0.999, f64::INFINITY, "epsilon"),
        ];

        for (b1, b2, eps, expected) in cases {
            let err = AdamGradient::new(Replay::new([]), b1, b2, eps).unwrap_err();
            assert!(matches!(err, SpsaErr::InvalidHyperparameter { name, .. } if name == expected));
        }
    }
}
