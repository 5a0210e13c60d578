use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::network::{ReactionNetwork, starvation_rate};
use crate::propensity::{recompute_propensities, select_reaction};
use crate::sampling::{leap_count, waiting_time};
use crate::trajectory::Trajectory;

const TIME_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regime {
    /// `a0 == 0`: nothing can fire any more. Time and state were left as is.
    Idle,
    Exact { reaction: usize },
    /// `firings` is the total number of firings drawn over all reactions.
    Leap { firings: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub time: f64,
    pub regime: Regime,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InterventionAction {
    SetPopulation { species: usize, value: f64 },
    AddPopulation { species: usize, delta: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intervention {
    pub time: f64,
    pub actions: Vec<InterventionAction>,
}

#[derive(Debug)]
pub struct Model {
    network: Arc<ReactionNetwork>,
    config: SimConfig,
    rng: ChaCha8Rng,
    state: Vec<f64>,
    time: f64,
    rates: Vec<f64>,
    propensities: Vec<f64>,
    total_rate: f64,
    leap_update: Vec<f64>,
    drought_active: bool,
    interventions: Vec<Intervention>,
    next_intervention: usize,
    steps: u64,
}

impl Model {
    pub fn new(catalog: &Catalog, config: SimConfig, seed: u64) -> Result<Self, SimError> {
        let network = ReactionNetwork::build(catalog, &config)?;
        Self::from_network(Arc::new(network), config, seed)
    }

    pub fn from_network(
        network: Arc<ReactionNetwork>,
        config: SimConfig,
        seed: u64,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let mut rates = network.initial_rates().to_vec();
        let reproduction_start = network.reproduction_start();
        for sp in network.species() {
            rates[reproduction_start + sp.index] = config.growth_scale * sp.growth;
        }
        let n_species = network.n_species();
        let n_reactions = network.n_reactions();
        Ok(Self {
            state: network.initial_state().to_vec(),
            network,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            time: 0.0,
            rates,
            propensities: vec![0.0; n_reactions],
            total_rate: 0.0,
            leap_update: vec![0.0; n_species],
            drought_active: false,
            interventions: Vec::new(),
            next_intervention: 0,
            steps: 0,
        })
    }

    pub fn with_interventions(
        mut self,
        interventions: Vec<Intervention>,
    ) -> Result<Self, SimError> {
        let n_species = self.network.n_species();
        let mut last_time = -f64::INFINITY;
        for event in &interventions {
            if !(event.time.is_finite() && event.time >= 0.0) {
                return Err(SimError::InvalidArgument(
                    "intervention times must be finite and non-negative".into(),
                ));
            }
            if event.time + TIME_EPSILON < last_time {
                return Err(SimError::InvalidArgument(
                    "intervention times must be sorted".into(),
                ));
            }
            last_time = event.time;
            if event.actions.is_empty() {
                return Err(SimError::InvalidArgument(
                    "each intervention must specify at least one action".into(),
                ));
            }
            for action in &event.actions {
                let (species, value) = match *action {
                    InterventionAction::SetPopulation { species, value } => (species, value),
                    InterventionAction::AddPopulation { species, delta } => (species, delta),
                };
                if species >= n_species {
                    return Err(SimError::InvalidArgument(format!(
                        "intervention refers to invalid species index {species}"
                    )));
                }
                if !value.is_finite() {
                    return Err(SimError::InvalidArgument(format!(
                        "intervention on species {species} carries non-finite value {value}"
                    )));
                }
            }
        }
        self.interventions = interventions;
        self.next_intervention = 0;
        Ok(self)
    }

    pub fn network(&self) -> &ReactionNetwork {
        &self.network
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn reproduction_rate(&self, species: usize) -> f64 {
        self.rates[self.network.reproduction_start() + species]
    }

    pub fn propensities(&self) -> &[f64] {
        &self.propensities
    }

    /// `a0` as of the last refresh.
    pub fn total_rate(&self) -> f64 {
        self.total_rate
    }

    pub fn drought_active(&self) -> bool {
        self.drought_active
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn set_population(&mut self, species: usize, value: f64) -> Result<(), SimError> {
        if species >= self.state.len() {
            return Err(SimError::InvalidArgument(format!(
                "species index {species} exceeds number of species {}",
                self.state.len()
            )));
        }
        if !(value.is_finite() && value >= 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "population must be finite and non-negative, got {value}"
            )));
        }
        self.state[species] = value;
        Ok(())
    }

    /// Recomputes the state-dependent rates and every propensity, returning
    /// the new total rate `a0`.
    pub fn refresh(&mut self) -> Result<f64, SimError> {
        self.refresh_rates()?;
        self.total_rate = recompute_propensities(
            self.network.reactions(),
            &self.rates,
            &self.state,
            &mut self.propensities,
        )?;
        Ok(self.total_rate)
    }

    fn refresh_rates(&mut self) -> Result<(), SimError> {
        let network = &*self.network;
        for &(species, reaction) in network.starving() {
            let rate = starvation_rate(
                &self.state,
                species,
                network.prey(species),
                self.config.starvation_epsilon,
            );
            if !rate.is_finite() {
                return Err(SimError::Arithmetic(format!(
                    "starvation rate of '{}' is not finite ({rate})",
                    network.species()[species].name
                )));
            }
            self.rates[reaction] = rate;
        }

        if let Some(drought) = self.config.drought {
            if self.time > drought.onset {
                if !self.drought_active {
                    info!(time = self.time, onset = drought.onset, "drought regime started");
                    self.drought_active = true;
                }
                let start = network.reproduction_start();
                for sp in network.species().iter().filter(|sp| sp.is_plant()) {
                    self.rates[start + sp.index] = drought.growth_scale * sp.growth;
                }
            }
        }
        Ok(())
    }

    pub fn step(&mut self) -> Result<Step, SimError> {
        let total_rate = self.refresh()?;
        if total_rate <= 0.0 {
            debug!(time = self.time, "no reaction can fire, model is idle");
            return Ok(Step {
                time: self.time,
                regime: Regime::Idle,
            });
        }

        let tau = waiting_time(&mut self.rng, total_rate);
        if !tau.is_finite() {
            return Err(SimError::Arithmetic(format!(
                "waiting time is not finite for total rate {total_rate}"
            )));
        }
        let next_time = self.time + tau;
        if next_time <= self.time {
            return Err(SimError::Arithmetic(format!(
                "clock cannot advance at total rate {total_rate} from time {}",
                self.time
            )));
        }
        let exact = self.config.leap_criterion.is_exact(tau, total_rate);
        self.time = next_time;

        let regime = if exact {
            let target = self.rng.random::<f64>() * total_rate;
            let reaction = select_reaction(&self.propensities, target);
            for delta in self.network.reactions()[reaction].deltas() {
                self.state[delta.species] += f64::from(delta.delta);
            }
            Regime::Exact { reaction }
        } else {
            self.leap_update.fill(0.0);
            let mut firings = 0.0;
            for (idx, reaction) in self.network.reactions().iter().enumerate() {
                let count = leap_count(
                    &mut self.rng,
                    self.propensities[idx] * tau,
                    self.config.poisson_threshold,
                )?;
                if count > 0.0 {
                    for delta in reaction.deltas() {
                        self.leap_update[delta.species] += f64::from(delta.delta) * count;
                    }
                    firings += count;
                }
            }
            for (value, update) in self.state.iter_mut().zip(&self.leap_update) {
                *value += update;
            }
            Regime::Leap { firings }
        };

        self.guard_negative();
        self.steps += 1;
        Ok(Step {
            time: self.time,
            regime,
        })
    }

    fn guard_negative(&mut self) {
        for (idx, value) in self.state.iter_mut().enumerate() {
            if *value < 0.0 {
                warn!(
                    species = %self.network.species()[idx].name,
                    population = *value,
                    time = self.time,
                    clamped = self.config.clamp_negative,
                    "population went negative"
                );
                if self.config.clamp_negative {
                    *value = 0.0;
                }
            }
        }
    }

    fn apply_due_interventions(&mut self) {
        while let Some(event) = self.interventions.get(self.next_intervention) {
            if self.time + TIME_EPSILON < event.time {
                break;
            }
            for action in &event.actions {
                match *action {
                    InterventionAction::SetPopulation { species, value } => {
                        self.state[species] = value;
                    }
                    InterventionAction::AddPopulation { species, delta } => {
                        self.state[species] += delta;
                    }
                }
            }
            debug!(time = self.time, at = event.time, "applied intervention");
            self.next_intervention += 1;
        }
    }

    /// Steps until the model time passes `tmax`.
    ///
    /// The check happens before each step, so the last recorded time may lie
    /// one step beyond `tmax`. An idle model jumps to the next pending
    /// intervention, or ends the run early when none is due before `tmax`.
    pub fn simulate(&mut self, tmax: f64) -> Result<Trajectory, SimError> {
        if !(tmax.is_finite() && tmax >= 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "tmax must be finite and non-negative, got {tmax}"
            )));
        }
        let mut trajectory = Trajectory::new(self.network.labels());
        let mut run_steps = 0u64;
        debug!(tmax, start = self.time, "starting run");

        while self.time <= tmax {
            self.apply_due_interventions();
            self.guard_negative();
            if let Some(limit) = self.config.max_steps {
                if run_steps >= limit {
                    warn!(limit, time = self.time, "run stopped at step limit");
                    break;
                }
            }
            let step = self.step()?;
            run_steps += 1;
            if step.regime == Regime::Idle {
                if trajectory.is_empty() {
                    trajectory.record(step.time, &self.state);
                }
                match self.interventions.get(self.next_intervention) {
                    Some(event) if event.time <= tmax => {
                        debug!(
                            time = self.time,
                            until = event.time,
                            "idle until next intervention"
                        );
                        self.time = event.time;
                        continue;
                    }
                    _ => break,
                }
            }
            trajectory.record(step.time, &self.state);
        }

        debug!(
            steps = run_steps,
            time = self.time,
            recorded = trajectory.len(),
            "run finished"
        );
        Ok(trajectory)
    }
}
