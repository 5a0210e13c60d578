//! Stochastic simulation of predator / prey / plant food webs.
//!
//! A [`Catalog`] describes the species and who eats whom. It is compiled
//! into a [`ReactionNetwork`] of predation, reproduction and starvation
//! reactions, which a [`Model`] advances with Gillespie's direct method,
//! switching to tau-leaping when the drawn waiting time is short.
//!
//! ```no_run
//! use foodweb::{Catalog, Model, SimConfig};
//!
//! let config = SimConfig {
//!     max_steps: Some(100_000),
//!     ..SimConfig::default()
//! };
//! let mut model = Model::new(&Catalog::savanna(), config, 7)?;
//! let trajectory = model.simulate(0.5)?;
//! for (time, state) in trajectory.rows() {
//!     println!("{time:.6} {state:?}");
//! }
//! # Ok::<(), foodweb::SimError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod model;
pub mod network;
pub mod propensity;
pub mod sampling;
pub mod trajectory;

#[cfg(feature = "python")]
mod python;

pub use catalog::{Catalog, Diet, SpeciesKind, SpeciesSpec};
pub use config::{DroughtConfig, LeapCriterion, SimConfig};
pub use ensemble::run_ensemble;
pub use error::SimError;
pub use model::{Intervention, InterventionAction, Model, Regime, Step};
pub use network::{Reaction, ReactionFamily, ReactionNetwork, Species};
pub use trajectory::Trajectory;
