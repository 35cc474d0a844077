mod adam;
mod momentum;

pub use adam::AdamGradient;
pub use momentum::MomentumGradient;

/// Default decay of the momentum moving average.
pub const DEFAULT_DECAY: f64 = 0.9;
/// Default decay of Adam's first moment.
pub const DEFAULT_DECAY1: f64 = 0.9;
/// Default decay of Adam's second moment.
pub const DEFAULT_DECAY2: f64 = 0.999;
/// Default term added to Adam's normalizer.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// The bias correction denominator `1 - decay^iteration` of a zero-initialized moving average.
fn bias_correction(decay: f64, iteration: usize) -> f64 {
    1. - decay.powf(iteration as f64)
}

#[cfg(test)]
mod test_utils {
    use std::collections::VecDeque;

    use ndarray::{Array1, ArrayView1};

    use crate::{GradientEstimator, Loss, Result};

    /// Hands out a fixed sequence of `(value, gradient)` pairs, ignoring the objective.
    #[derive(Debug)]
    pub struct Replay {
        updates: VecDeque<(f64, Array1<f64>)>,
    }

    impl Replay {
        pub fn new<I: IntoIterator<Item = Array1<f64>>>(gradients: I) -> Self {
            let updates = gradients
                .into_iter()
                .enumerate()
                .map(|(i, g)| (i as f64, g))
                .collect();

            Self { updates }
        }

        pub fn repeat(gradient: Array1<f64>, n: usize) -> Self {
            Self::new(std::iter::repeat_n(gradient, n))
        }
    }

    impl GradientEstimator for Replay {
        fn compute_update(
            &mut self,
            _: &mut dyn Loss,
            _: ArrayView1<f64>,
            _: usize,
            _: f64,
        ) -> Result<(f64, Array1<f64>)> {
            Ok(self.updates.pop_front().expect("replay exhausted"))
        }
    }

    pub fn zero_loss(_: ArrayView1<f64>) -> f64 {
        0.
    }

    pub fn assert_close(got: ArrayView1<f64>, expected: ArrayView1<f64>, tol: f64) {
        assert_eq!(got.len(), expected.len());
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() <= tol, "{got} != {expected}");
        }
    }
}
