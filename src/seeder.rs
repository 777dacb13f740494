use cpm_common::{validate_seeding, Grid, InitError, Pixel, Seeding};
use log::{debug, warn};
use rand::distr::Uniform;
use rand::Rng;

/// Places `n` single-pixel seeds on a `width x height` grid.
///
/// Seeds land in the padded interior `[pad, width - pad) x [pad, height - pad)`
/// and are labeled `1..` in placement order. With `min_distance == 0` placement
/// is unconstrained; otherwise every pair of seeds is at least `min_distance`
/// apart and the whole run gets `n * max_attempts_per_seed` samples.
///
/// Distance-constrained runs that cannot place all `n` seeds return
/// [`InitError::PlacementExhausted`] carrying the partial seeding.
pub fn seed_cells<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    n: usize,
    pad: usize,
    min_distance: u32,
    max_attempts_per_seed: usize,
    rng: &mut R,
) -> Result<Seeding, InitError> {
    validate_seeding(width, height, pad, min_distance, max_attempts_per_seed)?;

    let seeding = if min_distance > 0 {
        seed_with_min_distance(width, height, n, pad, min_distance, max_attempts_per_seed, rng)?
    } else {
        seed_unconstrained(width, height, n, pad, rng)?
    };

    // The unconstrained overflow fill is an accepted outcome, not a shortfall.
    if min_distance == 0 || seeding.is_complete() {
        debug!("Placed {} seeds on a {}x{} grid.", seeding.seeds.len(), width, height);
        Ok(seeding)
    } else {
        Err(InitError::PlacementExhausted {
            requested: n,
            placed: seeding.seeds.len(),
            partial: Box::new(seeding),
        })
    }
}

fn interior_ranges(
    width: usize,
    height: usize,
    pad: usize,
) -> Result<(Uniform<usize>, Uniform<usize>), InitError> {
    let dist_x = Uniform::new(pad, width - pad).map_err(|e| InitError::invalid(e.to_string()))?;
    let dist_y = Uniform::new(pad, height - pad).map_err(|e| InitError::invalid(e.to_string()))?;
    Ok((dist_x, dist_y))
}

fn seed_unconstrained<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    n: usize,
    pad: usize,
    rng: &mut R,
) -> Result<Seeding, InitError> {
    let mut grid = Grid::new(width, height);
    let mut seeds = Vec::with_capacity(n);
    let interior_area = (width - 2 * pad) * (height - 2 * pad);

    if interior_area < n {
        // Overflow: every interior pixel becomes its own cell, in scan order.
        warn!(
            "Interior area {} is smaller than the {} requested cells; filling the interior.",
            interior_area, n
        );
        for x in pad..width - pad {
            for y in pad..height - pad {
                seeds.push(Pixel::new(x, y));
                grid.set(x, y, seeds.len() as u32);
            }
        }
        return Ok(Seeding { grid, seeds, requested: n });
    }

    let (dist_x, dist_y) = interior_ranges(width, height, pad)?;
    while seeds.len() < n {
        let x = rng.sample(&dist_x);
        let y = rng.sample(&dist_y);
        if grid.get(x, y) == 0 {
            seeds.push(Pixel::new(x, y));
            grid.set(x, y, seeds.len() as u32);
        }
    }

    Ok(Seeding { grid, seeds, requested: n })
}

fn seed_with_min_distance<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    n: usize,
    pad: usize,
    min_distance: u32,
    max_attempts_per_seed: usize,
    rng: &mut R,
) -> Result<Seeding, InitError> {
    let (dist_x, dist_y) = interior_ranges(width, height, pad)?;
    let min_dist_sq = min_distance as u64 * min_distance as u64;
    let budget = n.saturating_mul(max_attempts_per_seed);

    let mut seeds: Vec<Pixel> = Vec::with_capacity(n);
    let mut attempts = 0;
    while seeds.len() < n && attempts < budget {
        attempts += 1;
        let candidate = Pixel::new(rng.sample(&dist_x), rng.sample(&dist_y));
        if seeds.iter().all(|s| s.distance_squared(&candidate) >= min_dist_sq) {
            seeds.push(candidate);
        }
    }
    debug!(
        "Distance-constrained seeding: {}/{} seeds after {} of {} attempts.",
        seeds.len(),
        n,
        attempts,
        budget
    );

    let mut grid = Grid::new(width, height);
    for (i, seed) in seeds.iter().enumerate() {
        grid.set(seed.x, seed.y, i as u32 + 1);
    }

    Ok(Seeding { grid, seeds, requested: n })
}
