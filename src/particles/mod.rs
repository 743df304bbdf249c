//! Particles - molecules, waves and the rules between them

pub mod collision;
mod molecule;
mod wave;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub use collision::{AppliedImpulse, MAX_IMPULSE};
pub use molecule::{density_color, Molecule, MoleculeView, Rgb};
pub use wave::{Wave, WaveSpawn, WaveState};

/// Unique identifier of a molecule, never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoleculeId(u64);

static NEXT_MOLECULE_ID: AtomicU64 = AtomicU64::new(1);

impl MoleculeId {
    /// Generate a new unique molecule ID
    pub fn new() -> Self {
        MoleculeId(NEXT_MOLECULE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for MoleculeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Molecule({})", self.0)
    }
}

/// Unique identifier of a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u64);

static NEXT_WAVE_ID: AtomicU64 = AtomicU64::new(1);

impl WaveId {
    pub fn new() -> Self {
        WaveId(NEXT_WAVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for WaveId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WaveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wave({})", self.0)
    }
}
