use anyhow::ensure;
use log::{debug, info};
use ndarray::Array1;
use spsa::EstimatorBuilder;

use crate::{config::RunSpec, objective};

/// The outcome of a run.
#[derive(Debug)]
pub struct Report {
    pub point: Array1<f64>,
    pub value: f64,
}

/// Minimizes the objective of `spec` with constant gains: `x <- x - learning_rate * direction`.
///
/// # Args
/// * `spec` - The run specification.
///
/// # Returns
/// The final point and its objective value, or the first error encountered.
pub fn run(spec: RunSpec) -> anyhow::Result<Report> {
    let RunSpec {
        estimator,
        objective,
        initial_point,
        iterations,
        learning_rate,
        perturbation,
    } = spec;

    ensure!(!initial_point.is_empty(), "the initial point is empty");
    ensure!(
        learning_rate.is_finite() && learning_rate > 0.,
        "the learning rate must be positive, got {learning_rate}"
    );
    ensure!(
        perturbation.is_finite() && perturbation > 0.,
        "the perturbation must be positive, got {perturbation}"
    );

    let mut estimator = EstimatorBuilder::new().build(estimator)?;
    let mut loss = objective::build(objective);
    let mut x = Array1::from_vec(initial_point);

    info!(iterations = iterations.get(), dims = x.len(); "starting run");

    for k in 0..iterations.get() {
        let (value, direction) =
            estimator.compute_update(loss.as_mut(), x.view(), k, perturbation)?;
        x.scaled_add(-learning_rate, &direction);

        debug!(iteration = k, value = value; "step");
    }

    let value = loss.loss(x.view())?;
    info!(value = value; "run finished");

    Ok(Report { point: x, value })
}
