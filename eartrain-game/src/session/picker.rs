//! Target note selection

use eartrain_common::Note;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses the note the player must identify each round
pub trait TargetPicker: Send {
    fn pick(&mut self) -> Note;
}

/// Uniform pick over the full note set; no weighting, no exclusion of recent notes
pub struct UniformPicker {
    rng: StdRng,
}

impl UniformPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of targets
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl TargetPicker for UniformPicker {
    fn pick(&mut self) -> Note {
        Note::ALL[self.rng.gen_range(0..Note::ALL.len())]
    }
}
