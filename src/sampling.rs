use rand::Rng;
use rand::distr::Open01;
use rand_distr::{Distribution, Normal, Poisson};

use crate::error::SimError;

/// Holding time of the jump process, `-ln(U) / a0` with `U` uniform on (0, 1).
#[inline]
pub fn waiting_time<R: Rng + ?Sized>(rng: &mut R, total_rate: f64) -> f64 {
    let u: f64 = Open01.sample(rng);
    -u.ln() / total_rate
}

/// Number of firings of one reaction over a leap with expected count `mean`.
///
/// Small means use the exact Poisson tail. Larger ones use a Normal with the
/// same mean and variance, redrawn until the sample is non-negative.
pub fn leap_count<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    poisson_threshold: f64,
) -> Result<f64, SimError> {
    if mean <= 0.0 {
        return Ok(0.0);
    }
    if mean < poisson_threshold {
        let poisson = Poisson::new(mean).map_err(|err| {
            SimError::Arithmetic(format!("invalid Poisson mean {mean}: {err}"))
        })?;
        return Ok(poisson.sample(rng));
    }
    let normal = Normal::new(mean, mean.sqrt())
        .map_err(|err| SimError::Arithmetic(format!("invalid Normal mean {mean}: {err}")))?;
    loop {
        let draw = normal.sample(rng);
        if draw >= 0.0 {
            return Ok(draw);
        }
    }
}

/// Seed of trajectory `replicate` in an ensemble, mixed with one SplitMix64
/// round so neighbouring replicates get unrelated streams.
pub fn derive_seed(seed: Option<u64>, replicate: u64) -> u64 {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let base = seed.unwrap_or(0x0F00_D0EB_5EED_0001);
    let mut z = (base ^ replicate.wrapping_mul(GAMMA)).wrapping_add(GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
