use log::trace;
use ndarray::ArrayView1;

use super::{PointEstimate, PointSampler};
use crate::{
    Loss, Result,
    error::{check_positive, check_size},
};

/// The first order two-point sampler of SPSA.
///
/// For a direction `delta` it evaluates `plus = f(x + eps * delta)` and `minus = f(x - eps * delta)`
/// and yields `(plus + minus) / 2` as the value and `(plus - minus) / (2 * eps) * delta` as the
/// gradient sample.
#[derive(Debug, Default)]
pub struct TwoPointSampler {
    nfev: usize,
}

impl TwoPointSampler {
    /// Creates a new `TwoPointSampler`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the amount of objective evaluations performed so far.
    pub fn nfev(&self) -> usize {
        self.nfev
    }
}

impl PointSampler for TwoPointSampler {
    fn point_sample(
        &mut self,
        loss: &mut dyn Loss,
        x: ArrayView1<f64>,
        eps: f64,
        delta: ArrayView1<f64>,
    ) -> Result<PointEstimate> {
        check_size("direction", "point", delta.len(), x.len())?;
        let eps = check_positive("eps", eps)?;

        let step = &delta * eps;
        let plus = loss.loss((&x + &step).view())?;
        let minus = loss.loss((&x - &step).view())?;
        self.nfev += 2;

        trace!(nfev = self.nfev, plus = plus, minus = minus; "two-point sample");

        Ok(PointEstimate {
            value: (plus + minus) / 2.,
            gradient: &delta * ((plus - minus) / (2. * eps)),
            hessian: None,
        })
    }
}
