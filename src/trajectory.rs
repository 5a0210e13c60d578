/// Append-only record of `(time, state)` snapshots.
///
/// States are copied into one row-major buffer, `n_species` values per row,
/// with columns in the order of `labels`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    labels: Vec<String>,
    times: Vec<f64>,
    states: Vec<f64>,
    n_species: usize,
}

impl Trajectory {
    pub fn new(labels: Vec<String>) -> Self {
        let n_species = labels.len();
        Self {
            labels,
            times: Vec::new(),
            states: Vec::new(),
            n_species,
        }
    }

    pub fn record(&mut self, time: f64, state: &[f64]) {
        debug_assert_eq!(state.len(), self.n_species);
        self.times.push(time);
        self.states.extend_from_slice(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Flat row-major state matrix of shape `len() x n_species()`.
    pub fn states(&self) -> &[f64] {
        &self.states
    }

    pub fn state(&self, row: usize) -> Option<&[f64]> {
        let start = row.checked_mul(self.n_species)?;
        self.states.get(start..start + self.n_species)
    }

    pub fn rows(&self) -> impl Iterator<Item = (f64, &[f64])> {
        self.times
            .iter()
            .copied()
            .zip(self.states.chunks_exact(self.n_species.max(1)))
    }

    /// Population of one species over time, or `None` for an unknown index.
    pub fn column(&self, species: usize) -> Option<Vec<f64>> {
        if species >= self.n_species {
            return None;
        }
        Some(
            self.states
                .chunks_exact(self.n_species)
                .map(|row| row[species])
                .collect(),
        )
    }

    pub fn last(&self) -> Option<(f64, &[f64])> {
        let row = self.len().checked_sub(1)?;
        Some((self.times[row], self.state(row)?))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<f64>, Vec<f64>) {
        (self.labels, self.times, self.states)
    }
}
