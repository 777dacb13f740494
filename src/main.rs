use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;
use log::{info, debug, error};

use cpm_common::InitConfig;
use cpm_init::output;
use cpm_init::{CpmInitializer, GrowthOutcome};

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting CPM grid initializer...");

    // --- Load Configuration ---
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = InitConfig::load(&config_path)?;
    info!("Loaded configuration from {}", config_path);
    debug!("Configuration: {:#?}", config);

    let start_time = Instant::now();

    // --- Seeding and Growth ---
    let (init, outcome) = match CpmInitializer::run(config) {
        Ok(result) => result,
        Err(e) => {
            error!("Initialization failed: {:#}", e);
            return Err(e);
        }
    };
    match outcome {
        GrowthOutcome::Skipped => info!("No growth configured; keeping single-pixel seeds."),
        GrowthOutcome::Round { cells } => info!("Grew {} round cells.", cells),
        GrowthOutcome::Dla(report) => info!(
            "DLA reached {}/{} pixels in {} steps ({} claims).",
            report.occupied, report.target, report.steps, report.claims
        ),
    }
    info!(
        "Initialization finished in {:.3} s with {} cells on {} pixels.",
        start_time.elapsed().as_secs_f64(),
        init.grid().distinct_labels(),
        init.grid().occupied_count()
    );

    // --- Save Results ---
    let snapshot = init.snapshot();
    let output_cfg = &init.config().output;
    let format = output_cfg.format.as_deref().unwrap_or("json");
    save_or_log(output::save_snapshot(&snapshot, &output_cfg.base_filename, format).map(|_| ()))?;

    if output_cfg.save_seeds {
        let path = PathBuf::from(format!("{}_seeds.csv", output_cfg.base_filename));
        save_or_log(output::save_seeds_csv(init.seeds(), &path))?;
    } else {
        info!("Skipping saving seed positions as per config.");
    }

    info!("Initialization Complete.");
    Ok(())
}

fn save_or_log(result: Result<()>) -> Result<()> {
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
