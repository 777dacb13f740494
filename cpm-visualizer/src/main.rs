use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cpm_common::GridSnapshot;
use env_logger::Builder;
use log::{debug, info, warn, LevelFilter};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

mod export;
mod render;

use render::{generate_color_palette, render_cells, RenderOptions};

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input grid snapshot (.json, .bin or .msgpack)
    #[arg(short, long)]
    input: PathBuf,

    /// Output image path (.tif/.tiff for a label raster, .png for a rendered image)
    #[arg(short, long, default_value = "cells.png")]
    output: PathBuf,

    /// Output mode, inferred from the output extension when omitted
    #[arg(long, value_enum)]
    mode: Option<OutputMode>,

    /// Magnification of the rendered image
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Do not draw cell borders
    #[arg(long)]
    no_border: bool,

    /// Border color - a color name or "r,g,b"
    #[arg(long, default_value = "black")]
    border_color: String,

    /// Color per cell type as "tau:r,g,b"; repeat for several types.
    /// Defaults to 0 -> white, 1 -> red
    #[arg(long = "colormap", value_parser = parse_colormap_entry)]
    colormap: Vec<(u8, [u8; 3])>,

    /// Color every cell by label from a generated palette instead of by type
    #[arg(long)]
    palette: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    /// Raw labels, 8- or 16-bit grayscale TIFF
    Tiff,
    /// Colored PNG with cell borders
    Png,
}

// Color definitions for named colors (RGB format)
const COLOR_MAP: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
];

/// Parse a color name or an "r,g,b" triple
fn parse_color(color: &str) -> [u8; 3] {
    for &(name, rgb) in COLOR_MAP {
        if name.eq_ignore_ascii_case(color) {
            return rgb;
        }
    }
    if let Ok(rgb) = parse_rgb(color) {
        return rgb;
    }
    // Default to black if color not found
    warn!("Color '{}' not recognized, using black.", color);
    [0, 0, 0]
}

fn parse_rgb(s: &str) -> Result<[u8; 3]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        anyhow::bail!("expected r,g,b but got '{}'", s);
    }
    let mut rgb = [0u8; 3];
    for (channel, part) in rgb.iter_mut().zip(parts) {
        *channel = part
            .parse()
            .with_context(|| format!("invalid color channel '{}'", part))?;
    }
    Ok(rgb)
}

/// Parses one "tau:r,g,b" colormap entry
fn parse_colormap_entry(s: &str) -> Result<(u8, [u8; 3]), String> {
    let (tau, color) = s
        .split_once(':')
        .ok_or_else(|| format!("expected tau:r,g,b but got '{}'", s))?;
    let tau: u8 = tau
        .trim()
        .parse()
        .map_err(|e| format!("invalid cell type '{}': {}", tau, e))?;
    let color = parse_rgb(color).map_err(|e| e.to_string())?;
    Ok((tau, color))
}

/// Reads a snapshot, choosing the decoder from the file extension
fn load_snapshot(path: &Path) -> Result<GridSnapshot> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot file {}", path.display()))?;
    let reader = BufReader::new(file);
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let snapshot: GridSnapshot = match extension {
        "json" => serde_json::from_reader(reader).context("Failed to parse JSON snapshot")?,
        "bin" => bincode::deserialize_from(reader).context("Failed to parse bincode snapshot")?,
        "msgpack" => rmp_serde::from_read(reader).context("Failed to parse MessagePack snapshot")?,
        other => anyhow::bail!("Unknown snapshot extension '{}'", other),
    };

    if snapshot.tau.len() != snapshot.grid.cells().len() {
        anyhow::bail!("Snapshot tau array does not match the grid size");
    }
    Ok(snapshot)
}

fn output_mode(args: &Args) -> Result<OutputMode> {
    if let Some(mode) = args.mode {
        return Ok(mode);
    }
    match args.output.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => Ok(OutputMode::Tiff),
        Some(ext) if ext.eq_ignore_ascii_case("png") => Ok(OutputMode::Png),
        _ => anyhow::bail!(
            "Cannot infer output mode from '{}'; pass --mode",
            args.output.display()
        ),
    }
}

fn render_options(args: &Args, snapshot: &GridSnapshot) -> RenderOptions {
    let mut opts = RenderOptions {
        scale: args.scale,
        ..RenderOptions::default()
    };
    if !args.colormap.is_empty() {
        opts.colormap = args.colormap.iter().copied().collect::<BTreeMap<_, _>>();
        opts.colormap.entry(0).or_insert([255, 255, 255]);
    }
    opts.border = if args.no_border {
        None
    } else {
        Some(parse_color(&args.border_color))
    };
    if args.palette {
        let count = snapshot.grid.max_label() as usize;
        opts.label_colors = Some(generate_color_palette(count.max(1), snapshot.rng_seed));
    }
    opts
}

fn main() -> Result<()> {
    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    // Parse command line arguments
    let args = Args::parse();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Starting CPM grid visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output file: {}", args.output.display());
    let start_time = Instant::now();

    let snapshot = load_snapshot(&args.input)?;
    info!(
        "Loaded {}x{} grid with {} cells (strategy '{}').",
        snapshot.grid.width(),
        snapshot.grid.height(),
        snapshot.num_cells(),
        snapshot.strategy
    );

    match output_mode(&args)? {
        OutputMode::Tiff => {
            export::write_label_tiff(&snapshot.grid, &args.output)?;
        }
        OutputMode::Png => {
            let opts = render_options(&args, &snapshot);
            debug!("Render options: {:?}", opts);
            let image = render_cells(&snapshot.grid, &snapshot.tau, &opts)?;
            image
                .save(&args.output)
                .with_context(|| format!("Failed to write image to {}", args.output.display()))?;
            info!("Rendered {}x{} image.", image.width(), image.height());
        }
    }

    info!("Done in {:.2?}. Output saved to: {}", start_time.elapsed(), args.output.display());
    Ok(())
}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use cpm_common::{Grid, Pixel};

    fn write_snapshot(dir: &Path) -> PathBuf {
        let mut grid = Grid::new(6, 6);
        for x in 1..4 {
            for y in 1..3 {
                grid.set(x, y, 1);
            }
        }
        grid.set(4, 4, 2);
        let snapshot = GridSnapshot::new(grid, vec![Pixel::new(2, 1), Pixel::new(4, 4)], "round", 1);
        let path = dir.join("cells_grid.json");
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        path
    }

    fn args(input: PathBuf, output: PathBuf) -> Args {
        Args {
            input,
            output,
            mode: None,
            scale: 2,
            no_border: false,
            border_color: String::from("black"),
            colormap: Vec::new(),
            palette: false,
        }
    }

    #[test]
    fn test_png_generation() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_snapshot(dir.path());
        let output = dir.path().join("cells.png");

        let result = run_with_args(args(input, output.clone()));
        assert!(result.is_ok(), "Rendering failed: {:?}", result);

        let img = image::open(&output).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (12, 12));
    }

    #[test]
    fn test_tiff_generation() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_snapshot(dir.path());
        let output = dir.path().join("cells.tiff");

        run_with_args(args(input, output.clone())).unwrap();

        let img = image::open(&output).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(img.get_pixel(4, 4)[0], 2);
        assert_eq!(img.get_pixel(1, 2)[0], 1);
    }

    #[test]
    fn test_unknown_output_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_snapshot(dir.path());
        let result = run_with_args(args(input, dir.path().join("cells.gif")));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_colormap_entry() {
        assert_eq!(parse_colormap_entry("1:255,0,0").unwrap(), (1, [255, 0, 0]));
        assert_eq!(parse_colormap_entry("2: 10, 20, 30").unwrap(), (2, [10, 20, 30]));
        assert!(parse_colormap_entry("1-255,0,0").is_err());
        assert!(parse_colormap_entry("1:300,0,0").is_err());
    }

    #[test]
    fn test_parse_color_names_and_triples() {
        assert_eq!(parse_color("Blue"), [0, 0, 255]);
        assert_eq!(parse_color("12,34,56"), [12, 34, 56]);
        assert_eq!(parse_color("not-a-color"), [0, 0, 0]);
    }

    #[test]
    fn test_custom_colormap_keeps_background() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_snapshot(dir.path());
        let snapshot = load_snapshot(&input).unwrap();
        let mut a = args(input, dir.path().join("x.png"));
        a.colormap = vec![(1, [0, 128, 0])];
        a.palette = true;

        let opts = render_options(&a, &snapshot);
        assert_eq!(opts.colormap.get(&0), Some(&[255, 255, 255]));
        assert_eq!(opts.colormap.get(&1), Some(&[0, 128, 0]));
        assert_eq!(opts.label_colors.as_ref().map(Vec::len), Some(2));
    }
}
