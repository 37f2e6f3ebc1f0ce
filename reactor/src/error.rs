//! Error types for the reactor layer.

use {crate::store::StoreError, oraclenet_consensus::ConsensusError, thiserror::Error};

/// Errors that can occur while driving the reactor.
#[derive(Error, Debug)]
pub enum ReactorError {
    /// The vote-set core rejected an operation.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// The persistence backend failed.
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// An application Fn callback failed.
    #[error("fn callback failed: {0}")]
    FnCallback(String),

    /// The progress routine could not be spawned.
    #[error("progress routine failed to start: {0}")]
    Thread(#[from] std::io::Error),

    /// The reactor configuration is invalid.
    #[error("invalid config: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Convenience result type for reactor operations.
pub type Result<T> = std::result::Result<T, ReactorError>;
