use ndarray::{Array1, ArrayView1};
use spsa::{Loss, Result, SpsaErr};

use crate::config::ObjectiveSpec;

/// Squared euclidean distance to a fixed center.
pub struct Quadratic {
    center: Array1<f64>,
}

impl Quadratic {
    pub fn new(center: Array1<f64>) -> Self {
        Self { center }
    }
}

impl Loss for Quadratic {
    fn loss(&mut self, x: ArrayView1<f64>) -> Result<f64> {
        if x.len() != self.center.len() {
            return Err(SpsaErr::SizeMismatch {
                a: "point",
                b: "center",
                got: x.len(),
                expected: self.center.len(),
            });
        }

        Ok((&x - &self.center).mapv(|d| d.powi(2)).sum())
    }
}

/// The generalized Rosenbrock function, minimized at the all ones point.
pub struct Rosenbrock;

impl Loss for Rosenbrock {
    fn loss(&mut self, x: ArrayView1<f64>) -> Result<f64> {
        let value = x
            .windows(2)
            .into_iter()
            .map(|w| 100. * (w[1] - w[0].powi(2)).powi(2) + (1. - w[0]).powi(2))
            .sum();

        Ok(value)
    }
}

/// Instanciates the objective described by `spec`.
pub fn build(spec: ObjectiveSpec) -> Box<dyn Loss> {
    match spec {
        ObjectiveSpec::Quadratic { center } => Box::new(Quadratic::new(Array1::from_vec(center))),
        ObjectiveSpec::Rosenbrock => Box::new(Rosenbrock),
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn quadratic() {
        let mut loss = Quadratic::new(array![1., 2.]);

        assert_eq!(loss.loss(array![1., 2.].view()).unwrap(), 0.);
        assert_eq!(loss.loss(array![0., 0.].view()).unwrap(), 5.);
        assert!(loss.loss(array![0.].view()).is_err());
    }

    #[test]
    fn rosenbrock() {
        let mut loss = Rosenbrock;

        assert_eq!(loss.loss(array![1., 1., 1.].view()).unwrap(), 0.);
        assert!((loss.loss(array![-1.2, 1.].view()).unwrap() - 24.2).abs() < 1e-12);
    }
}
