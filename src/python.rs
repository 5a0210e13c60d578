use std::sync::Arc;

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::catalog::Catalog;
use crate::config::SimConfig;
use crate::ensemble::run_ensemble;
use crate::error::SimError;
use crate::model::Model;
use crate::network::ReactionNetwork;
use crate::sampling::derive_seed;
use crate::trajectory::Trajectory;

type PyTrajectory<'py> = (
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray2<f64>>,
    Vec<String>,
);

fn parse_config(config_json: Option<&str>) -> Result<SimConfig, SimError> {
    match config_json {
        Some(json) => SimConfig::from_json(json),
        None => Ok(SimConfig::default()),
    }
}

fn trajectory_into_py(py: Python<'_>, trajectory: Trajectory) -> PyResult<PyTrajectory<'_>> {
    let n_species = trajectory.n_species();
    let (labels, times, states) = trajectory.into_parts();
    let matrix = Array2::from_shape_vec((times.len(), n_species), states)
        .map_err(|e| PyValueError::new_err(format!("failed to shape state matrix: {e}")))?;
    Ok((times.into_pyarray(py), matrix.into_pyarray(py), labels))
}

/// Runs one trajectory and returns `(times, states, labels)`, with one
/// column of `states` per entry of `labels`.
#[pyfunction(signature = (catalog_json, tmax, seed=None, config_json=None))]
fn simulate<'py>(
    py: Python<'py>,
    catalog_json: &str,
    tmax: f64,
    seed: Option<u64>,
    config_json: Option<&str>,
) -> PyResult<PyTrajectory<'py>> {
    let catalog = Catalog::from_json(catalog_json)?;
    let config = parse_config(config_json)?;
    let trajectory = py.detach(move || -> Result<Trajectory, SimError> {
        let mut model = Model::new(&catalog, config, derive_seed(seed, 0))?;
        model.simulate(tmax)
    })?;
    trajectory_into_py(py, trajectory)
}

#[pyfunction(signature = (catalog_json, tmax, n_runs, n_threads=None, seed=None, config_json=None))]
fn simulate_ensemble<'py>(
    py: Python<'py>,
    catalog_json: &str,
    tmax: f64,
    n_runs: usize,
    n_threads: Option<usize>,
    seed: Option<u64>,
    config_json: Option<&str>,
) -> PyResult<Vec<PyTrajectory<'py>>> {
    let catalog = Catalog::from_json(catalog_json)?;
    let config = parse_config(config_json)?;
    let network = Arc::new(ReactionNetwork::build(&catalog, &config)?);
    let runs = py.detach(move || run_ensemble(network, &config, tmax, n_runs, n_threads, seed))?;
    runs.into_iter()
        .map(|trajectory| trajectory_into_py(py, trajectory))
        .collect()
}

#[pyfunction]
fn savanna_catalog_json() -> PyResult<String> {
    Ok(Catalog::savanna().to_json()?)
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    Ok(SimConfig::default().to_json()?)
}

#[pymodule]
fn foodweb(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(simulate, module)?)?;
    module.add_function(wrap_pyfunction!(simulate_ensemble, module)?)?;
    module.add_function(wrap_pyfunction!(savanna_catalog_json, module)?)?;
    module.add_function(wrap_pyfunction!(default_config_json, module)?)?;
    Ok(())
}
