use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::debug;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::model::Model;
use crate::network::ReactionNetwork;
use crate::sampling::derive_seed;
use crate::trajectory::Trajectory;

/// Runs `n_runs` independent trajectories of the same network.
///
/// Every run owns its model and a generator seeded from `seed` and its run
/// index, so results do not depend on scheduling or thread count.
pub fn run_ensemble(
    network: Arc<ReactionNetwork>,
    config: &SimConfig,
    tmax: f64,
    n_runs: usize,
    n_threads: Option<usize>,
    seed: Option<u64>,
) -> Result<Vec<Trajectory>, SimError> {
    if n_runs == 0 {
        return Err(SimError::InvalidArgument(
            "number of runs must be greater than zero".into(),
        ));
    }
    config.validate()?;
    debug!(n_runs, tmax, ?n_threads, "starting ensemble");

    let simulate = || -> Result<Vec<Trajectory>, SimError> {
        (0..n_runs)
            .into_par_iter()
            .map(|run| {
                let mut model = Model::from_network(
                    Arc::clone(&network),
                    config.clone(),
                    derive_seed(seed, run as u64),
                )?;
                model.simulate(tmax)
            })
            .collect()
    };

    match n_threads {
        Some(n) => ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?
            .install(simulate),
        None => simulate(),
    }
}
