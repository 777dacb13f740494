use crate::grid::Seeding;
use thiserror::Error;

/// Errors raised by seeding and growth.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("placed {placed} of {requested} seeds before the attempt budget ran out")]
    PlacementExhausted {
        requested: usize,
        placed: usize,
        /// Partial placement, usable if the caller accepts fewer cells.
        partial: Box<Seeding>,
    },

    #[error("DLA growth did not converge after {steps} steps ({occupied}/{target} pixels occupied)")]
    GrowthNonConvergent {
        steps: usize,
        occupied: usize,
        target: usize,
    },
}

impl InitError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        InitError::InvalidConfiguration(msg.into())
    }
}
