use serde::{Deserialize, Serialize};

/// Offsets `(dx, dy)` of the 8 compass neighbours, diagonals included.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// An integer grid coordinate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
}

impl Pixel {
    pub fn new(x: usize, y: usize) -> Self {
        Pixel { x, y }
    }

    /// Squared Euclidean distance, exact in integer arithmetic.
    pub fn distance_squared(&self, other: &Pixel) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }
}

/// A labeled CPM grid of shape `(width, height)`.
///
/// Label 0 is background; labels `1..` identify cells. Storage is x-major
/// (`x * height + y`), so iterating `cells` front to back is the scan order
/// used everywhere in the initializer: x outer, y inner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Creates an empty (all background) grid.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Builds a grid from x-major label data. Returns `None` on a length mismatch.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u32>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Grid { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Inverse of [`Grid::index`].
    #[inline(always)]
    pub fn pixel_at(&self, idx: usize) -> Pixel {
        Pixel::new(idx / self.height, idx % self.height)
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[self.index(x, y)]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, label: u32) {
        let idx = self.index(x, y);
        self.cells[idx] = label;
    }

    #[inline(always)]
    pub fn get_idx(&self, idx: usize) -> u32 {
        self.cells[idx]
    }

    #[inline(always)]
    pub fn set_idx(&mut self, idx: usize, label: u32) {
        self.cells[idx] = label;
    }

    /// Offsets `(x, y)` by `(dx, dy)`, returning `None` if the result leaves the grid.
    #[inline(always)]
    pub fn offset(&self, x: usize, y: usize, dx: i64, dy: i64) -> Option<Pixel> {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some(Pixel::new(nx as usize, ny as usize))
    }

    /// Largest label present (0 for an empty grid).
    pub fn max_label(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Number of non-background pixels.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&l| l > 0).count()
    }

    /// Pixel count per label, indexed by label (`counts[0]` is the background).
    pub fn label_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.max_label() as usize + 1];
        for &label in &self.cells {
            counts[label as usize] += 1;
        }
        counts
    }

    /// Pixel count of a single label.
    pub fn volume_of(&self, label: u32) -> usize {
        self.cells.iter().filter(|&&l| l == label).count()
    }

    /// Coordinates of all occupied pixels in scan order.
    pub fn occupied_pixels(&self) -> Vec<Pixel> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > 0)
            .map(|(idx, _)| self.pixel_at(idx))
            .collect()
    }

    /// Number of distinct non-zero labels.
    pub fn distinct_labels(&self) -> usize {
        self.label_counts().iter().skip(1).filter(|&&c| c > 0).count()
    }

    /// Default cell-type array: type 1 wherever a cell is present.
    pub fn default_tau(&self) -> Vec<u8> {
        self.cells.iter().map(|&l| u8::from(l > 0)).collect()
    }
}

/// Seeds placed by the seeder together with the grid they were written into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seeding {
    pub grid: Grid,
    /// Seed coordinates in placement order; `seeds[k]` carries label `k + 1`.
    pub seeds: Vec<Pixel>,
    /// Number of seeds asked for.
    pub requested: usize,
}

impl Seeding {
    /// True when every requested seed was placed.
    pub fn is_complete(&self) -> bool {
        self.seeds.len() >= self.requested
    }
}
