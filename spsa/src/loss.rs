use ndarray::ArrayView1;

use crate::Result;

/// An objective function to be minimized.
///
/// Every closure of the form `FnMut(ArrayView1<f64>) -> f64` is a `Loss`. Objectives that can fail,
/// for example because they are evaluated on a remote backend, should implement this trait directly
/// and report their failures through `SpsaErr::Loss`.
pub trait Loss {
    /// Evaluates the objective at `x`.
    ///
    /// # Arguments
    /// * `x` - The point to evaluate.
    ///
    /// # Returns
    /// The value of the objective or the error raised while evaluating it.
    fn loss(&mut self, x: ArrayView1<f64>) -> Result<f64>;
}

impl<F> Loss for F
where
    F: FnMut(ArrayView1<f64>) -> f64,
{
    fn loss(&mut self, x: ArrayView1<f64>) -> Result<f64> {
        Ok(self(x))
    }
}
