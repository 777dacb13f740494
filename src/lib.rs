//! Initial grids for cellular Potts model simulations.
//!
//! Seeds are placed by [`seeder::seed_cells`] and grown either into disks
//! ([`round::grow_round`]) or by diffusion-limited aggregation
//! ([`dla::grow_dla`]). [`initializer::CpmInitializer`] drives the whole run
//! from an [`cpm_common::InitConfig`].

pub mod dla;
pub mod initializer;
pub mod output;
pub mod round;
pub mod seeder;

pub use dla::{grow_dla, DlaGrower, DlaReport};
pub use initializer::{CpmInitializer, GrowthOutcome};
pub use round::grow_round;
pub use seeder::seed_cells;
