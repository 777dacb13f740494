use cpm_common::{Grid, InitError};
use log::debug;

/// Grows every seed of `grid` into a filled disk of radius `r`, in place.
///
/// Seeds are re-discovered by scanning the grid (x outer, y inner) and
/// relabeled with their 1-based scan index, so the result does not keep the
/// seeder's placement order. Every pixel with `dx² + dy² < r²` around a seed,
/// clipped to the grid, gets that seed's index. Disks are painted one after
/// another and a later disk overwrites an earlier one; seeds spaced at least
/// `2r` apart give exact, disjoint disks.
///
/// Returns the number of disks painted.
pub fn grow_round(grid: &mut Grid, r: u32) -> Result<usize, InitError> {
    if r == 0 {
        return Err(InitError::invalid("disk radius must be positive"));
    }

    let seeds = grid.occupied_pixels();
    for (idx, seed) in seeds.iter().enumerate() {
        paint_disk(grid, idx as u32 + 1, seed.x, seed.y, r);
    }

    debug!("Grew {} seeds into disks of radius {}.", seeds.len(), r);
    Ok(seeds.len())
}

#[inline]
fn paint_disk(grid: &mut Grid, label: u32, x: usize, y: usize, r: u32) {
    let r = r as i64;
    let r_sq = r * r;
    for dx in -r..r {
        for dy in -r..r {
            if dx * dx + dy * dy >= r_sq {
                continue;
            }
            if let Some(p) = grid.offset(x, y, dx, dy) {
                grid.set(p.x, p.y, label);
            }
        }
    }
}

/// Pixel count of an unclipped disk of radius `r`.
pub fn disk_area(r: u32) -> usize {
    let r = r as i64;
    (-r..r)
        .flat_map(|dx| (-r..r).map(move |dy| dx * dx + dy * dy))
        .filter(|&d_sq| d_sq < r * r)
        .count()
}
