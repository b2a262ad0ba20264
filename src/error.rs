//! Error types for Cadence
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while planning a campaign
#[derive(Debug, Error)]
pub enum CadenceError {
    /// Roster or tunables cannot produce a schedule
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input data is missing a required precondition
    #[error("Data error: {0}")]
    Data(String),

    /// A week gathered nothing while items remained in the pool
    #[error("Degenerate scheduling in week {week}: {placed} items placed, {remaining} remaining")]
    DegenerateScheduling { week: u32, placed: usize, remaining: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;
