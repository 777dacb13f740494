use serde::{Serialize, Deserialize};
use crate::grid::{Grid, Pixel};

/// The finished initial configuration handed to export/visualization.
#[derive(Debug, Clone, Serialize, Deserialize)] // Derive traits for easy saving/loading
pub struct GridSnapshot {
    /// The labeled grid (sigma).
    pub grid: Grid,
    /// Per-pixel cell type (tau), same x-major layout as `grid`.
    pub tau: Vec<u8>,
    /// Seed coordinates in placement order.
    pub seeds: Vec<Pixel>,
    /// `cell_volumes[k]` is the pixel count of label `k + 1`.
    pub cell_volumes: Vec<u32>,
    /// Growth strategy that produced the grid ("none", "round" or "dla").
    pub strategy: String,
    /// RNG seed the run was started from.
    pub rng_seed: u64,
}

impl GridSnapshot {
    /// Builds a snapshot with the default tau (type 1 for every occupied pixel).
    pub fn new(grid: Grid, seeds: Vec<Pixel>, strategy: &str, rng_seed: u64) -> Self {
        let tau = grid.default_tau();
        let cell_volumes = grid
            .label_counts()
            .into_iter()
            .skip(1)
            .map(|c| c as u32)
            .collect();
        GridSnapshot {
            grid,
            tau,
            seeds,
            cell_volumes,
            strategy: strategy.to_string(),
            rng_seed,
        }
    }

    pub fn num_cells(&self) -> usize {
        self.cell_volumes.iter().filter(|&&v| v > 0).count()
    }
}
