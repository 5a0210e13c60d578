//! Declarative description of an ecosystem: who lives in it, who eats whom,
//! and how many of each there are at time zero.
//!
//! A [`Catalog`] is plain data. It is validated and indexed only when a
//! [`ReactionNetwork`](crate::network::ReactionNetwork) is built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeciesKind {
    Plant,
    /// `predation` is the ferocity (predators) or repletion (prey) coefficient,
    /// used as the rate of every eating reaction this animal takes part in as
    /// the eater.
    Animal { predation: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub name: String,
    pub growth: f64,
    pub kind: SpeciesKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diet {
    pub predator: String,
    pub prey: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub species: Vec<SpeciesSpec>,
    #[serde(default)]
    pub diets: Vec<Diet>,
    #[serde(default)]
    pub initial: BTreeMap<String, f64>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn plant(mut self, name: impl Into<String>, growth: f64) -> Self {
        self.species.push(SpeciesSpec {
            name: name.into(),
            growth,
            kind: SpeciesKind::Plant,
        });
        self
    }

    pub fn animal(mut self, name: impl Into<String>, growth: f64, predation: f64) -> Self {
        self.species.push(SpeciesSpec {
            name: name.into(),
            growth,
            kind: SpeciesKind::Animal { predation },
        });
        self
    }

    pub fn diet(mut self, predator: impl Into<String>, prey: &[&str]) -> Self {
        self.diets.push(Diet {
            predator: predator.into(),
            prey: prey.iter().map(|name| name.to_string()).collect(),
        });
        self
    }

    pub fn population(mut self, name: impl Into<String>, count: f64) -> Self {
        self.initial.insert(name.into(), count);
        self
    }

    pub fn prey_of(&self, predator: &str) -> Option<&[String]> {
        self.diets
            .iter()
            .find(|diet| diet.predator == predator)
            .map(|diet| diet.prey.as_slice())
    }

    /// A small savanna: two predators, three grazers and three plants.
    pub fn savanna() -> Self {
        Self::new()
            .animal("Lions", 0.13, 0.1)
            .animal("Hyenas", 0.1, 0.2)
            .animal("Gazelles", 0.6, 0.3)
            .animal("Zebre", 0.4, 0.9)
            .animal("Antelopes", 0.9, 0.9)
            .plant("Grass", 0.6)
            .plant("Acacia", 0.3)
            .plant("Ficus", 0.4)
            .diet("Lions", &["Gazelles", "Zebre"])
            .diet("Hyenas", &["Gazelles", "Antelopes"])
            .diet("Gazelles", &["Grass", "Ficus"])
            .diet("Zebre", &["Acacia", "Grass"])
            .diet("Antelopes", &["Grass"])
            .population("Lions", 10.0)
            .population("Hyenas", 20.0)
            .population("Gazelles", 40.0)
            .population("Zebre", 40.0)
            .population("Antelopes", 60.0)
            .population("Acacia", 40.0)
            .population("Ficus", 40.0)
            .population("Grass", 20.0)
    }
}
