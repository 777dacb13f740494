use crate::dla::{grow_dla, DlaReport};
use crate::round::{disk_area, grow_round};
use crate::seeder::seed_cells;
use anyhow::Result;
use cpm_common::{Grid, GridSnapshot, GrowthStrategy, InitConfig, InitError, Pixel};
use log::{debug, info, warn};
use rand::prelude::*;

/// What the growth phase did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// Seeds were left as single pixels.
    Skipped,
    /// Number of disks painted.
    Round { cells: usize },
    Dla(DlaReport),
}

/// Builds the initial CPM grid: seeding followed by at most one growth phase.
pub struct CpmInitializer {
    config: InitConfig,
    /// RNG shared by seeding and DLA growth, seeded from `seeding.rng_seed`.
    rng: StdRng,
    grid: Grid,
    /// Seed coordinates; `seeds[k]` carries label `k + 1`.
    seeds: Vec<Pixel>,
    grown: bool,
}

impl CpmInitializer {
    /// Creates a new initializer and places the seeds.
    pub fn new(config: InitConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seeding.rng_seed);

        let s = &config.seeding;
        let seeding = match seed_cells(
            config.grid.width,
            config.grid.height,
            s.num_cells,
            s.pad,
            s.min_distance,
            s.max_attempts_per_seed,
            &mut rng,
        ) {
            Ok(seeding) => seeding,
            Err(InitError::PlacementExhausted { requested, placed, partial })
                if s.allow_partial_placement =>
            {
                warn!(
                    "Only {} of {} seeds fit with min_distance {}; continuing with a partial placement.",
                    placed, requested, s.min_distance
                );
                *partial
            }
            Err(e) => return Err(e.into()),
        };
        info!("Seeded {} cells.", seeding.seeds.len());

        Ok(Self {
            config,
            rng,
            grid: seeding.grid,
            seeds: seeding.seeds,
            grown: false,
        })
    }

    /// Runs the configured growth strategy on the seeded grid.
    pub fn grow(&mut self) -> Result<GrowthOutcome> {
        if self.grown {
            anyhow::bail!("Growth already ran on this grid.");
        }
        self.grown = true;

        let growth = &self.config.growth;
        let outcome = match growth.strategy {
            GrowthStrategy::None => GrowthOutcome::Skipped,
            GrowthStrategy::Round => {
                let radius = growth
                    .radius
                    .ok_or_else(|| InitError::invalid("round growth needs a radius"))?;
                let cells = grow_round(&mut self.grid, radius)?;
                // Round growth relabels by scan index, so scan order is label order.
                let grid = &self.grid;
                self.seeds.sort_by_key(|s| grid.index(s.x, s.y));
                debug!("Unclipped disk of radius {} covers {} pixels.", radius, disk_area(radius));
                GrowthOutcome::Round { cells }
            }
            GrowthStrategy::Dla => {
                let volume = growth
                    .volume
                    .ok_or_else(|| InitError::invalid("DLA growth needs a volume"))?;
                let report = grow_dla(&mut self.grid, volume, growth.max_steps, &mut self.rng)?;
                GrowthOutcome::Dla(report)
            }
        };

        info!(
            "Growth '{}' finished: {} pixels occupied.",
            growth.strategy.name(),
            self.grid.occupied_count()
        );
        debug!("Growth outcome: {:?}", outcome);
        Ok(outcome)
    }

    /// Seeds and grows in one call.
    pub fn run(config: InitConfig) -> Result<(Self, GrowthOutcome)> {
        let mut init = Self::new(config)?;
        let outcome = init.grow()?;
        Ok((init, outcome))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn seeds(&self) -> &[Pixel] {
        &self.seeds
    }

    pub fn config(&self) -> &InitConfig {
        &self.config
    }

    /// Packages the current grid for export.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::new(
            self.grid.clone(),
            self.seeds.clone(),
            self.config.growth.strategy.name(),
            self.config.seeding.rng_seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpm_common::{GridConfig, GrowthConfig, OutputConfig, SeedingConfig};

    fn config(
        size: usize,
        num_cells: usize,
        pad: usize,
        min_distance: u32,
        growth: GrowthConfig,
    ) -> InitConfig {
        InitConfig {
            grid: GridConfig { width: size, height: size },
            seeding: SeedingConfig {
                num_cells,
                pad,
                min_distance,
                max_attempts_per_seed: 1000,
                rng_seed: 42,
                allow_partial_placement: false,
            },
            growth,
            output: OutputConfig {
                base_filename: "test".to_string(),
                format: None,
                save_seeds: false,
            },
        }
    }

    #[test]
    fn round_cells_end_to_end() {
        let growth = GrowthConfig {
            strategy: GrowthStrategy::Round,
            radius: Some(5),
            ..GrowthConfig::default()
        };
        let (init, outcome) = CpmInitializer::run(config(100, 25, 10, 10, growth)).unwrap();

        assert_eq!(outcome, GrowthOutcome::Round { cells: 25 });
        let seeds = init.seeds();
        assert_eq!(seeds.len(), 25);
        for (i, a) in seeds.iter().enumerate() {
            assert!(a.x >= 10 && a.x < 90 && a.y >= 10 && a.y < 90);
            for b in &seeds[i + 1..] {
                assert!(a.distance_squared(b) >= 100);
            }
        }

        let counts = init.grid().label_counts();
        assert_eq!(counts.len(), 26);
        assert!(counts[1..].iter().all(|&c| c == disk_area(5)));
        assert_eq!(init.grid().occupied_count(), 25 * 69);
    }

    #[test]
    fn round_growth_keeps_seed_labels_in_sync() {
        let growth = GrowthConfig {
            strategy: GrowthStrategy::Round,
            radius: Some(5),
            ..GrowthConfig::default()
        };
        let (init, _) = CpmInitializer::run(config(100, 25, 10, 10, growth)).unwrap();

        let snapshot = init.snapshot();
        assert_eq!(snapshot.seeds.len(), 25);
        for (k, s) in snapshot.seeds.iter().enumerate() {
            assert_eq!(snapshot.grid.get(s.x, s.y), k as u32 + 1, "seed {:?}", s);
        }
    }

    #[test]
    fn dla_cells_end_to_end() {
        let growth = GrowthConfig {
            strategy: GrowthStrategy::Dla,
            volume: Some(50),
            ..GrowthConfig::default()
        };
        let (init, outcome) = CpmInitializer::run(config(50, 4, 5, 0, growth)).unwrap();

        match outcome {
            GrowthOutcome::Dla(report) => {
                assert_eq!(report.target, 200);
                assert_eq!(report.occupied, 200);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let grid = init.grid();
        assert_eq!(grid.distinct_labels(), 4);
        assert_eq!(grid.occupied_count(), 200);
        assert!(grid.label_counts()[1..].iter().all(|&c| c <= 50));

        let snapshot = init.snapshot();
        assert_eq!(snapshot.strategy, "dla");
        assert_eq!(snapshot.cell_volumes.iter().sum::<u32>(), 200);
        assert_eq!(snapshot.seeds.len(), 4);
    }

    #[test]
    fn seeds_only_keeps_placement_labels() {
        let (init, outcome) =
            CpmInitializer::run(config(40, 6, 4, 0, GrowthConfig::default())).unwrap();
        assert_eq!(outcome, GrowthOutcome::Skipped);
        for (i, s) in init.seeds().iter().enumerate() {
            assert_eq!(init.grid().get(s.x, s.y), i as u32 + 1);
        }
    }

    #[test]
    fn shortfall_fails_unless_partial_allowed() {
        let mut cfg = config(20, 40, 5, 8, GrowthConfig::default());
        cfg.seeding.max_attempts_per_seed = 10;
        let err = CpmInitializer::new(cfg.clone()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<InitError>(),
            Some(InitError::PlacementExhausted { requested: 40, .. })
        ));

        cfg.seeding.allow_partial_placement = true;
        let init = CpmInitializer::new(cfg).unwrap();
        assert!(!init.seeds().is_empty());
        assert!(init.seeds().len() < 40);
        assert_eq!(init.grid().occupied_count(), init.seeds().len());
    }

    #[test]
    fn growth_runs_only_once() {
        let growth = GrowthConfig {
            strategy: GrowthStrategy::Round,
            radius: Some(2),
            ..GrowthConfig::default()
        };
        let (mut init, _) = CpmInitializer::run(config(30, 3, 5, 6, growth)).unwrap();
        assert!(init.grow().is_err());
    }

    #[test]
    fn same_rng_seed_reproduces_the_grid() {
        let growth = GrowthConfig {
            strategy: GrowthStrategy::Dla,
            volume: Some(20),
            ..GrowthConfig::default()
        };
        let cfg = config(30, 5, 3, 0, growth);
        let (a, _) = CpmInitializer::run(cfg.clone()).unwrap();
        let (b, _) = CpmInitializer::run(cfg).unwrap();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.seeds(), b.seeds());
    }
}
