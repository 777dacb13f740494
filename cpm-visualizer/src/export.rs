use anyhow::{Context, Result};
use cpm_common::Grid;
use image::{ImageBuffer, ImageFormat, Luma};
use log::info;
use std::path::Path;

/// Pixel depth of an exported label raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelDepth {
    Eight,
    Sixteen,
}

/// 8-bit while every label fits in a byte, 16-bit up to 65535.
pub fn label_depth(max_label: u32) -> Result<LabelDepth> {
    if max_label < 256 {
        Ok(LabelDepth::Eight)
    } else if max_label <= u16::MAX as u32 {
        Ok(LabelDepth::Sixteen)
    } else {
        anyhow::bail!("Label {} does not fit a 16-bit raster", max_label)
    }
}

/// Writes the raw labels of `grid` to a TIFF file.
///
/// The raster follows the array layout of the grid: image row `x`, image
/// column `y`, so the image is `height` pixels wide and `width` pixels tall.
pub fn write_label_tiff(grid: &Grid, path: &Path) -> Result<LabelDepth> {
    let depth = label_depth(grid.max_label())?;
    let img_width = grid.height() as u32;
    let img_height = grid.width() as u32;

    match depth {
        LabelDepth::Eight => {
            let data: Vec<u8> = grid.cells().iter().map(|&l| l as u8).collect();
            let image: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_raw(img_width, img_height, data)
                .context("Label buffer does not match grid dimensions")?;
            image
                .save_with_format(path, ImageFormat::Tiff)
                .with_context(|| format!("Failed to write TIFF to {}", path.display()))?;
        }
        LabelDepth::Sixteen => {
            let data: Vec<u16> = grid.cells().iter().map(|&l| l as u16).collect();
            let image: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(img_width, img_height, data)
                .context("Label buffer does not match grid dimensions")?;
            image
                .save_with_format(path, ImageFormat::Tiff)
                .with_context(|| format!("Failed to write TIFF to {}", path.display()))?;
        }
    }

    info!("Label raster ({:?}) written to {}", depth, path.display());
    Ok(depth)
}
