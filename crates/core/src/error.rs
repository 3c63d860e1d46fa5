//! Error types
//!
//! Only loading and construction paths return errors. Flow transitions never
//! fail: malformed user input is an escalation, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The template has no collectible fields at all
    #[error("template has no collectible fields")]
    EmptyTemplate,

    #[error("deserialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
