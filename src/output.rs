use anyhow::{Context, Result};
use cpm_common::{GridSnapshot, Pixel};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the snapshot as `<base>_grid.{json,bin,msgpack}` and returns the path.
pub fn save_snapshot(snapshot: &GridSnapshot, base_filename: &str, format: &str) -> Result<PathBuf> {
    match format {
        "json" => {
            let filename = PathBuf::from(format!("{}_grid.json", base_filename));
            let json_string = serde_json::to_string(snapshot)
                .context("Error serializing grid snapshot to JSON")?;
            let mut file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
            file.write_all(json_string.as_bytes())
                .with_context(|| format!("Error writing snapshot JSON to '{}'", filename.display()))?;
            info!("Grid saved to {} ({} KB)", filename.display(), json_string.len() / 1024);
            Ok(filename)
        }
        "bincode" => {
            // Binary format (much more compact)
            let filename = PathBuf::from(format!("{}_grid.bin", base_filename));
            let mut file = BufWriter::new(
                File::create(&filename)
                    .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?,
            );
            bincode::serialize_into(&mut file, snapshot)
                .context("Error serializing grid snapshot to bincode")?;
            file.flush()?;
            info!("Grid saved to {} (binary format)", filename.display());
            Ok(filename)
        }
        "messagepack" => {
            // MessagePack format (compact and cross-platform)
            let filename = PathBuf::from(format!("{}_grid.msgpack", base_filename));
            let mut file = BufWriter::new(
                File::create(&filename)
                    .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?,
            );
            rmp_serde::encode::write(&mut file, snapshot)
                .context("Error serializing grid snapshot to MessagePack")?;
            file.flush()?;
            info!("Grid saved to {} (MessagePack format)", filename.display());
            Ok(filename)
        }
        _ => {
            error!("Unknown output format: {}. Using JSON instead.", format);
            save_snapshot(snapshot, base_filename, "json")
        }
    }
}

/// Writes seed coordinates as `label,x,y` rows.
pub fn save_seeds_csv(seeds: &[Pixel], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating seeds file '{}'", path.display()))?;
    writer.write_record(["label", "x", "y"])?;
    for (i, seed) in seeds.iter().enumerate() {
        writer.write_record(&[(i + 1).to_string(), seed.x.to_string(), seed.y.to_string()])?;
    }
    writer.flush()?;
    info!("Seed positions saved to {}", path.display());
    Ok(())
}
