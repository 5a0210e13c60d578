use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{Catalog, SpeciesKind};
use crate::config::SimConfig;
use crate::error::SimError;

#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    pub index: usize,
    pub name: String,
    pub growth: f64,
    pub kind: SpeciesKind,
}

impl Species {
    pub fn is_plant(&self) -> bool {
        matches!(self.kind, SpeciesKind::Plant)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reactant {
    pub species: usize,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeciesDelta {
    pub species: usize,
    pub delta: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionFamily {
    Predation { predator: usize, prey: usize },
    Reproduction { species: usize },
    Starvation { species: usize },
}

#[derive(Clone, Debug)]
pub struct Reaction {
    family: ReactionFamily,
    reactants: Vec<Reactant>,
    deltas: Vec<SpeciesDelta>,
}

impl Reaction {
    fn predation(predator: usize, prey: usize) -> Self {
        Self {
            family: ReactionFamily::Predation { predator, prey },
            reactants: vec![
                Reactant {
                    species: predator,
                    count: 1,
                },
                Reactant {
                    species: prey,
                    count: 1,
                },
            ],
            deltas: vec![SpeciesDelta {
                species: prey,
                delta: -1,
            }],
        }
    }

    fn reproduction(species: usize) -> Self {
        Self {
            family: ReactionFamily::Reproduction { species },
            reactants: vec![Reactant { species, count: 2 }],
            deltas: vec![SpeciesDelta { species, delta: 1 }],
        }
    }

    fn starvation(species: usize) -> Self {
        Self {
            family: ReactionFamily::Starvation { species },
            reactants: vec![Reactant { species, count: 1 }],
            deltas: vec![SpeciesDelta { species, delta: -1 }],
        }
    }

    pub fn family(&self) -> ReactionFamily {
        self.family
    }

    pub fn reactants(&self) -> &[Reactant] {
        &self.reactants
    }

    pub fn deltas(&self) -> &[SpeciesDelta] {
        &self.deltas
    }

    pub fn reactant_vector(&self, n_species: usize) -> Vec<u32> {
        let mut dense = vec![0; n_species];
        for reactant in &self.reactants {
            dense[reactant.species] += reactant.count;
        }
        dense
    }

    pub fn delta_vector(&self, n_species: usize) -> Vec<i32> {
        let mut dense = vec![0; n_species];
        for delta in &self.deltas {
            dense[delta.species] += delta.delta;
        }
        dense
    }

    pub fn net_change(&self) -> i32 {
        self.deltas.iter().map(|d| d.delta).sum()
    }
}

/// Immutable structure of a food web: the species arena, the reactions in
/// their fixed order and the starting values of everything that evolves.
///
/// Reactions are laid out as `[predation..., reproduction..., starvation...]`.
/// Reproduction has exactly one entry per species, so the reproduction rate
/// of species `i` lives at `reproduction_start + i`.
#[derive(Clone, Debug)]
pub struct ReactionNetwork {
    species: Vec<Species>,
    by_name: HashMap<String, usize>,
    reactions: Vec<Reaction>,
    prey: Vec<Vec<usize>>,
    initial_state: Vec<f64>,
    initial_rates: Vec<f64>,
    reproduction_start: usize,
    starvation_start: usize,
    /// `(species, reaction)` for every starvation reaction, in reaction order.
    starving: Vec<(usize, usize)>,
}

impl ReactionNetwork {
    pub fn build(catalog: &Catalog, config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        if catalog.species.is_empty() {
            return Err(SimError::Configuration(
                "catalog must contain at least one species".into(),
            ));
        }

        let mut species = Vec::with_capacity(catalog.species.len());
        let mut by_name = HashMap::with_capacity(catalog.species.len());
        for (index, spec) in catalog.species.iter().enumerate() {
            if by_name.insert(spec.name.clone(), index).is_some() {
                return Err(SimError::Configuration(format!(
                    "species '{}' is listed more than once",
                    spec.name
                )));
            }
            if !(spec.growth.is_finite() && spec.growth >= 0.0) {
                return Err(SimError::Configuration(format!(
                    "species '{}' has invalid growth rate {}",
                    spec.name, spec.growth
                )));
            }
            if let SpeciesKind::Animal { predation } = spec.kind {
                if !(predation.is_finite() && predation >= 0.0) {
                    return Err(SimError::Configuration(format!(
                        "species '{}' has invalid predation coefficient {}",
                        spec.name, predation
                    )));
                }
            }
            species.push(Species {
                index,
                name: spec.name.clone(),
                growth: spec.growth,
                kind: spec.kind,
            });
        }
        let n_species = species.len();
        let resolve = |name: &str, role: &str| -> Result<usize, SimError> {
            by_name.get(name).copied().ok_or_else(|| {
                SimError::Configuration(format!("unknown species '{name}' used as {role}"))
            })
        };

        let mut prey = vec![Vec::new(); n_species];
        let mut reactions = Vec::new();
        let mut initial_rates = Vec::new();

        for diet in &catalog.diets {
            let predator = resolve(&diet.predator, "predator")?;
            let SpeciesKind::Animal { predation } = species[predator].kind else {
                return Err(SimError::Configuration(format!(
                    "plant '{}' cannot be listed as a predator",
                    diet.predator
                )));
            };
            if !prey[predator].is_empty() {
                return Err(SimError::Configuration(format!(
                    "species '{}' has more than one diet entry",
                    diet.predator
                )));
            }
            for prey_name in &diet.prey {
                let victim = resolve(prey_name, "prey")?;
                prey[predator].push(victim);
                reactions.push(Reaction::predation(predator, victim));
                initial_rates.push(predation);
            }
        }

        let reproduction_start = reactions.len();
        for sp in &species {
            reactions.push(Reaction::reproduction(sp.index));
            initial_rates.push(config.growth_scale * sp.growth);
        }

        let mut initial_state = vec![0.0; n_species];
        for (name, &count) in &catalog.initial {
            let idx = resolve(name, "initial population")?;
            if !(count.is_finite() && count >= 0.0) {
                return Err(SimError::Configuration(format!(
                    "initial population of '{name}' must be finite and non-negative, got {count}"
                )));
            }
            initial_state[idx] = count;
        }

        let starvation_start = reactions.len();
        let mut starving = Vec::new();
        for sp in species.iter().filter(|sp| !sp.is_plant()) {
            if prey[sp.index].is_empty() {
                return Err(SimError::Configuration(format!(
                    "animal '{}' has no prey, its starvation rate is undefined",
                    sp.name
                )));
            }
            starving.push((sp.index, reactions.len()));
            reactions.push(Reaction::starvation(sp.index));
            initial_rates.push(starvation_rate(
                &initial_state,
                sp.index,
                &prey[sp.index],
                config.starvation_epsilon,
            ));
        }

        debug!(
            species = n_species,
            reactions = reactions.len(),
            reproduction_start,
            starvation_start,
            "built reaction network"
        );

        Ok(Self {
            species,
            by_name,
            reactions,
            prey,
            initial_state,
            initial_rates,
            reproduction_start,
            starvation_start,
            starving,
        })
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn labels(&self) -> Vec<String> {
        self.species.iter().map(|sp| sp.name.clone()).collect()
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn prey(&self, species: usize) -> &[usize] {
        &self.prey[species]
    }

    pub fn initial_state(&self) -> &[f64] {
        &self.initial_state
    }

    pub fn initial_rates(&self) -> &[f64] {
        &self.initial_rates
    }

    pub fn reproduction_start(&self) -> usize {
        self.reproduction_start
    }

    pub fn starvation_start(&self) -> usize {
        self.starvation_start
    }

    pub(crate) fn starving(&self) -> &[(usize, usize)] {
        &self.starving
    }
}

/// `population / (sum of prey populations + epsilon)`.
#[inline]
pub(crate) fn starvation_rate(
    state: &[f64],
    species: usize,
    prey: &[usize],
    epsilon: f64,
) -> f64 {
    let food: f64 = prey.iter().map(|&p| state[p]).sum();
    state[species] / (food + epsilon)
}
