mod config;
mod driver;
mod objective;

use std::env;

use anyhow::Context;
use log::info;

use crate::config::RunSpec;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .context("usage: spsa-runner <run-spec.json>")?;

    let spec = RunSpec::from_file(&path)?;
    info!("loaded run spec from {path}");

    let report = driver::run(spec)?;
    println!("value: {}", report.value);
    println!("point: {}", report.point);

    Ok(())
}
