//! Reactor tunables.

/// Compiled-in defaults for the oracle consensus reactor.
///
/// The validity period is deliberately one second short of the progress
/// interval: a vote set that failed to finalize is guaranteed to be
/// expired by the tick that would otherwise re-propose its Fn.
#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// Chain this reactor participates in; vote sets from other chains
    /// are rejected.
    pub chain_id: String,

    /// Seconds a vote set stays eligible for merging before it is
    /// archived as timed out.
    /// Default: 119.
    pub vote_set_validity_secs: i64,

    /// Wall-clock period of the proposer tick, seconds.  All nodes align
    /// to multiples of this, waking in loose lock-step.
    /// Default: 120.
    pub progress_interval_secs: u64,

    /// Maximum size of an Fn execution context in bytes.
    /// Default: 1024.
    pub max_context_bytes: usize,

    /// Maximum size of a framed gossip message in bytes.
    /// Default: 1 MiB.
    pub max_message_bytes: usize,

    /// Per-channel send-queue capacity advertised to the host P2P layer.
    /// Default: 100.
    pub channel_send_queue_capacity: usize,
}

impl ReactorConfig {
    /// Production defaults for the given chain.
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            vote_set_validity_secs: 119,
            progress_interval_secs: 120,
            max_context_bytes: 1024,
            max_message_bytes: 1_048_576, // 1 MiB
            channel_send_queue_capacity: 100,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id.is_empty() {
            return Err(ConfigError::EmptyChainId);
        }
        if self.progress_interval_secs == 0 {
            return Err(ConfigError::InvalidProgressInterval);
        }
        if self.vote_set_validity_secs <= 0
            || self.vote_set_validity_secs as u64 >= self.progress_interval_secs
        {
            return Err(ConfigError::InvalidValidityPeriod {
                validity_secs: self.vote_set_validity_secs,
                interval_secs: self.progress_interval_secs,
            });
        }
        if self.max_message_bytes == 0 || self.max_context_bytes == 0 {
            return Err(ConfigError::InvalidSizeLimit);
        }
        Ok(())
    }

    /// Config with short intervals for local testing.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn dev_default() -> Self {
        Self {
            chain_id: "oraclenet-dev".to_string(),
            vote_set_validity_secs: 1,
            progress_interval_secs: 2,
            max_context_bytes: 1024,
            max_message_bytes: 1_048_576,
            channel_send_queue_capacity: 100,
        }
    }
}

/// Errors in reactor configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("chain_id must be non-empty")]
    EmptyChainId,
    #[error("progress_interval_secs must be > 0")]
    InvalidProgressInterval,
    #[error(
        "vote_set_validity_secs must be in (0, progress_interval_secs): \
         got validity {validity_secs}, interval {interval_secs}"
    )]
    InvalidValidityPeriod {
        validity_secs: i64,
        interval_secs: u64,
    },
    #[error("size limits must be > 0")]
    InvalidSizeLimit,
}
