//! Error types for the oracle consensus core.

use thiserror::Error;

/// Errors produced by the vote-set state machine and its message types.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// A validator address does not match the snapshot at the same slot.
    #[error("validator address mismatch at slot {slot}")]
    InvalidValidatorAddress {
        /// Slot index where the mismatch was found.
        slot: usize,
    },

    /// A validator signature failed verification.
    #[error("invalid validator signature at slot {slot}")]
    InvalidSignature {
        /// Slot index of the failing signature.
        slot: usize,
    },

    /// A slot was expected to carry a vote but is empty.
    #[error("no vote present at slot {slot}")]
    VoteNotPresent {
        /// The empty slot index.
        slot: usize,
    },

    /// The validator at this slot has already contributed a vote.
    #[error("vote already cast at slot {slot}")]
    VoteAlreadyCast {
        /// The occupied slot index.
        slot: usize,
    },

    /// An oracle signature is already present in the aggregate response.
    #[error("oracle signature already present at slot {slot}")]
    ResponseSignatureAlreadyPresent {
        /// The occupied slot index.
        slot: usize,
    },

    /// Two vote sets disagree on payload, context, chain, or roster shape.
    #[error("cannot merge vote sets with differing payloads")]
    MergeDiffPayload,

    /// No Fn is registered under the given id.
    #[error("unknown fn id: {0}")]
    InvalidFnId(String),

    /// An Fn is already registered under the given id.
    #[error("fn id already registered: {0}")]
    FnAlreadyRegistered(String),

    /// The execution context exceeds the configured limit.
    #[error("execution context too large: {size} bytes (max {max} bytes)")]
    ContextTooLarge {
        /// Actual context size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The vote payload is malformed with respect to the snapshot.
    #[error("invalid payload: {0}")]
    PayloadInvalid(String),

    /// The vote set was produced for a different chain.
    #[error("chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch {
        /// Local chain id.
        expected: String,
        /// Chain id carried by the message.
        got: String,
    },

    /// The vote set's arrays do not match the snapshot size.
    #[error("roster size mismatch: expected {expected}, got {got}")]
    RosterSizeMismatch {
        /// Snapshot validator count.
        expected: usize,
        /// Array length carried by the message.
        got: usize,
    },

    /// The claimed total voting power does not match the set bits.
    #[error("voting power mismatch: claimed {claimed}, computed {computed}")]
    VotingPowerMismatch {
        /// Power carried by the message.
        claimed: u64,
        /// Power recomputed from the bit array.
        computed: u64,
    },

    /// The vote set's validity window has elapsed.
    #[error("vote set expired (created at {created}, now {now})")]
    Expired {
        /// Creation time, Unix seconds.
        created: i64,
        /// Observation time, Unix seconds.
        now: i64,
    },

    /// A frame exceeds the maximum allowed size.
    #[error("message too large: {size} bytes (max {max} bytes)")]
    MessageTooLarge {
        /// Actual frame size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Failed to encode or decode a message.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The local signer refused or failed to sign.
    #[error("signing failed: {0}")]
    Signing(#[from] solana_signer::SignerError),
}

/// Convenience result type for consensus-core operations.
pub type Result<T> = std::result::Result<T, ConsensusError>;
