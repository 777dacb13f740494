use anyhow::Result;
use cpm_common::Grid;
use image::RgbImage;
use palette::{FromColor, Hsv, Srgb};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// How a grid is turned into a colour image.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Integer magnification; every grid pixel becomes a `scale x scale` block.
    pub scale: u32,
    /// Colour per cell type. Type 0 is the background.
    pub colormap: BTreeMap<u8, [u8; 3]>,
    /// Border colour, `None` to skip borders.
    pub border: Option<[u8; 3]>,
    /// Colour per label (`label_colors[label - 1]`), overriding the colormap for cells.
    pub label_colors: Option<Vec<[u8; 3]>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            scale: 1,
            colormap: BTreeMap::from([(0, [255, 255, 255]), (1, [255, 0, 0])]),
            border: Some([0, 0, 0]),
            label_colors: None,
        }
    }
}

/// Renders sigma/tau into an RGB image with optional cell borders.
///
/// The image uses the grid's array layout (row = x, column = y). A border
/// pixel is one whose 4-neighbour in the scaled image carries another label,
/// so borders appear on both sides of every cell boundary.
pub fn render_cells(grid: &Grid, tau: &[u8], opts: &RenderOptions) -> Result<RgbImage> {
    if tau.len() != grid.cells().len() {
        anyhow::bail!(
            "Cell type array has {} entries, grid has {} pixels",
            tau.len(),
            grid.cells().len()
        );
    }
    if opts.scale == 0 {
        anyhow::bail!("Scale must be at least 1");
    }
    let background = *opts
        .colormap
        .get(&0)
        .ok_or_else(|| anyhow::anyhow!("Colormap has no background entry (type 0)"))?;
    if matches!(&opts.label_colors, Some(colors) if colors.is_empty()) {
        anyhow::bail!("Label palette is empty");
    }
    if opts.label_colors.is_none() {
        for &t in tau.iter().filter(|&&t| t > 0) {
            if !opts.colormap.contains_key(&t) {
                anyhow::bail!("Colormap has no colour for cell type {}", t);
            }
        }
    }

    let scale = opts.scale as usize;
    let out_w = grid.height() * scale;
    let out_h = grid.width() * scale;
    let label_at = |row: usize, col: usize| grid.get(row / scale, col / scale);

    let mut buffer = vec![0u8; out_w * out_h * 3];
    buffer
        .par_chunks_mut(out_w * 3)
        .enumerate()
        .for_each(|(row, pixels)| {
            for col in 0..out_w {
                let label = label_at(row, col);
                let color = if label == 0 {
                    background
                } else if let Some(colors) = &opts.label_colors {
                    colors[(label as usize - 1) % colors.len()]
                } else {
                    let t = tau[grid.index(row / scale, col / scale)];
                    opts.colormap.get(&t).copied().unwrap_or(background)
                };

                let on_border = opts.border.is_some()
                    && ((row > 0 && label_at(row - 1, col) != label)
                        || (row + 1 < out_h && label_at(row + 1, col) != label)
                        || (col > 0 && label_at(row, col - 1) != label)
                        || (col + 1 < out_w && label_at(row, col + 1) != label));
                let color = match opts.border {
                    Some(border) if on_border => border,
                    _ => color,
                };
                pixels[col * 3..col * 3 + 3].copy_from_slice(&color);
            }
        });

    RgbImage::from_raw(out_w as u32, out_h as u32, buffer)
        .ok_or_else(|| anyhow::anyhow!("Rendered buffer does not match image size"))
}

/// Generate a color palette with a specified number of colors
pub fn generate_color_palette(count: usize, seed: u64) -> Vec<[u8; 3]> {
    let mut colors = Vec::with_capacity(count);
    let mut rng = StdRng::seed_from_u64(seed);

    for i in 0..count {
        // Use HSV color space for better distribution
        let hue = (i as f32) / (count as f32);
        let saturation = 0.7 + rng.random_range(-0.1..0.1);
        let value = 0.8 + rng.random_range(-0.1..0.1);

        let hsv = Hsv::new(hue * 360.0, saturation, value);
        let rgb = Srgb::from_color(hsv);

        colors.push([
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        ]);
    }

    // Shuffle the colors to make adjacent labels less similar
    colors.shuffle(&mut rng);

    colors
}
