pub mod config;
pub mod error;
pub mod grid;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{InitConfig, GridConfig, SeedingConfig, GrowthConfig, GrowthStrategy, OutputConfig, validate_seeding};
pub use error::InitError;
pub use grid::{Grid, Pixel, Seeding, NEIGHBOR_OFFSETS};
pub use snapshot::GridSnapshot;
