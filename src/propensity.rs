use crate::error::SimError;
use crate::network::{Reactant, Reaction};

/// Mass-action combinatorial factor: the number of distinct reactant
/// combinations available in `state`.
///
/// Populations are continuous, so a pool smaller than the reaction needs can
/// make the falling factorial negative. It is floored at zero.
#[inline]
pub fn combinations(reactants: &[Reactant], state: &[f64]) -> f64 {
    let mut h = 1.0;
    for reactant in reactants {
        h *= choose(state[reactant.species], reactant.count);
    }
    h
}

#[inline]
fn choose(value: f64, count: u32) -> f64 {
    match count {
        0 => 1.0,
        1 => value.max(0.0),
        2 if value > 1.0 => value * (value - 1.0) * 0.5,
        2 => 0.0,
        _ => {
            let mut acc = 1.0;
            for i in 0..count {
                let term = value - f64::from(i);
                if term <= 0.0 {
                    return 0.0;
                }
                acc *= term / f64::from(i + 1);
            }
            acc
        }
    }
}

/// Refreshes every propensity from the current state and rates and returns
/// their sum, the total rate `a0`.
pub fn recompute_propensities(
    reactions: &[Reaction],
    rates: &[f64],
    state: &[f64],
    propensities: &mut [f64],
) -> Result<f64, SimError> {
    let mut total = 0.0;
    for (idx, reaction) in reactions.iter().enumerate() {
        let value = combinations(reaction.reactants(), state) * rates[idx];
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::Arithmetic(format!(
                "propensity of reaction {idx} is invalid: {value} (rate {})",
                rates[idx]
            )));
        }
        propensities[idx] = value;
        total += value;
    }
    if !total.is_finite() {
        return Err(SimError::Arithmetic(format!(
            "total reaction rate is not finite: {total}"
        )));
    }
    Ok(total)
}

/// Direct-method selection: the first reaction whose running propensity sum
/// strictly exceeds `target`.
///
/// `target` is expected in `[0, sum)`. Rounding can push it to the sum itself,
/// in which case the last reaction with a positive propensity is returned.
pub fn select_reaction(propensities: &[f64], target: f64) -> usize {
    let mut running = 0.0;
    let mut last_positive = 0;
    for (idx, &value) in propensities.iter().enumerate() {
        if value > 0.0 {
            last_positive = idx;
        }
        running += value;
        if running > target {
            return idx;
        }
    }
    last_positive
}
