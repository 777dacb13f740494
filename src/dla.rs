use cpm_common::{Grid, InitError, NEIGHBOR_OFFSETS};
use log::{debug, trace};
use rand::distr::Uniform;
use rand::Rng;

/// Summary of a finished DLA run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlaReport {
    /// Growth steps (full grid sweeps) performed.
    pub steps: usize,
    /// Pixels claimed across all steps.
    pub claims: usize,
    /// Occupied pixels at the end of the run.
    pub occupied: usize,
    /// Aggregate target, `volume * n`.
    pub target: usize,
}

/// Diffusion-limited aggregation over an existing labeled grid.
///
/// Every step sweeps the grid in scan order. An empty pixel picks one of its 8
/// neighbours at random and joins that neighbour's cell if the cell is still
/// below `volume`. Claims are written straight into the grid, so a pixel
/// claimed earlier in a sweep can already feed later claims of the same sweep.
///
/// Growth stops once the total number of occupied pixels reaches
/// `volume * n`, where `n` is the largest label. This is an aggregate
/// threshold: individual cells are capped at `volume` but are not required to
/// reach it.
pub struct DlaGrower<'a> {
    grid: &'a mut Grid,
    volume: usize,
    /// Pixel count per label, kept in sync with every claim.
    counts: Vec<usize>,
    occupied: usize,
    target: usize,
    direction: Uniform<usize>,
}

impl<'a> DlaGrower<'a> {
    pub fn new(grid: &'a mut Grid, volume: usize) -> Result<Self, InitError> {
        if volume == 0 {
            return Err(InitError::invalid("target cell volume must be positive"));
        }
        let n = grid.max_label() as usize;
        let target = volume.saturating_mul(n);
        let area = grid.width() * grid.height();
        if target > area {
            return Err(InitError::invalid(format!(
                "{} cells of volume {} need {} pixels, grid has {}",
                n, volume, target, area
            )));
        }

        let counts = grid.label_counts();
        let occupied = area - counts[0];
        let direction = Uniform::new(0, NEIGHBOR_OFFSETS.len())
            .map_err(|e| InitError::invalid(e.to_string()))?;

        Ok(Self {
            grid,
            volume,
            counts,
            occupied,
            target,
            direction,
        })
    }

    pub fn is_converged(&self) -> bool {
        self.occupied >= self.target
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Current pixel count of `label`.
    pub fn volume_of(&self, label: u32) -> usize {
        self.counts.get(label as usize).copied().unwrap_or(0)
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Runs one sweep over the grid and returns the number of claimed pixels.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut claims = 0;
        for idx in 0..self.grid.cells().len() {
            // A pixel only changes during its own visit, so the live value
            // equals its value at the start of the sweep.
            if self.grid.get_idx(idx) != 0 {
                continue;
            }
            let p = self.grid.pixel_at(idx);
            let (dx, dy) = NEIGHBOR_OFFSETS[rng.sample(&self.direction)];
            let neighbor = match self.grid.offset(p.x, p.y, dx, dy) {
                Some(nb) => nb,
                None => continue,
            };
            let label = self.grid.get(neighbor.x, neighbor.y);
            if label > 0 && self.counts[label as usize] < self.volume {
                self.grid.set_idx(idx, label);
                self.counts[label as usize] += 1;
                self.occupied += 1;
                claims += 1;
            }
        }
        claims
    }

    /// Steps until the aggregate target is reached or `max_steps` sweeps are spent.
    pub fn run<R: Rng + ?Sized>(mut self, max_steps: usize, rng: &mut R) -> Result<DlaReport, InitError> {
        let mut steps = 0;
        let mut claims = 0;

        while !self.is_converged() {
            if steps >= max_steps {
                return Err(InitError::GrowthNonConvergent {
                    steps,
                    occupied: self.occupied,
                    target: self.target,
                });
            }
            let claimed = self.step(rng);
            steps += 1;
            claims += claimed;
            trace!(
                "DLA step {}: claimed {} pixels, {}/{} occupied",
                steps,
                claimed,
                self.occupied,
                self.target
            );
        }

        debug!(
            "DLA converged after {} steps ({} claims, {} pixels occupied).",
            steps, claims, self.occupied
        );
        Ok(DlaReport {
            steps,
            claims,
            occupied: self.occupied,
            target: self.target,
        })
    }
}

/// Grows the cells of `grid` in place by DLA until `volume * n` pixels are occupied.
pub fn grow_dla<R: Rng + ?Sized>(
    grid: &mut Grid,
    volume: usize,
    max_steps: usize,
    rng: &mut R,
) -> Result<DlaReport, InitError> {
    DlaGrower::new(grid, volume)?.run(max_steps, rng)
}
