//! Fn-execution message types.
//!
//! An Fn run produces one [`FnIndividualExecutionResponse`] per validator;
//! the vote set accumulates them into an [`FnExecutionResponse`] whose
//! oracle-signature slots are positional by validator index.  Canonical
//! equality (status, error, hash, slot count — everything except the
//! signature bits) decides merge compatibility; per-slot sign-bytes bind a
//! validator signature to its own slot.

use {
    crate::{
        codec,
        error::{ConsensusError, Result},
        validator_set::ValidatorSet,
    },
    serde::{Deserialize, Serialize},
};

/// Request half of a vote payload.  Only the Fn id participates in
/// canonical equality; the struct is the extension point for future
/// request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnExecutionRequest {
    /// Registry key of the Fn this round executes.
    pub fn_id: String,
}

impl FnExecutionRequest {
    /// Build a request for the given Fn id.
    pub fn new(fn_id: impl Into<String>) -> Self {
        Self {
            fn_id: fn_id.into(),
        }
    }

    /// Canonical equality: same Fn id.
    pub fn canonical_eq(&self, other: &Self) -> bool {
        self.fn_id == other.fn_id
    }

    /// Byte encoding contributed to the per-slot sign-bytes.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }
}

/// One validator's result of executing an Fn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnIndividualExecutionResponse {
    /// Application status code; contributors to one vote set must agree.
    pub status: i32,
    /// Application error string, empty on success.
    pub error: String,
    /// SHA-512 digest of the Fn-produced message.
    pub hash: Vec<u8>,
    /// The application's own signature over the message.
    pub oracle_signature: Vec<u8>,
}

impl FnIndividualExecutionResponse {
    /// Byte encoding used as the payload part of the slot sign-bytes.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }
}

/// Aggregate of individual responses, slot `i` owned by validator `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnExecutionResponse {
    /// Agreed status code.
    pub status: i32,
    /// Agreed error string.
    pub error: String,
    /// Agreed message digest.
    pub hash: Vec<u8>,
    /// Per-validator oracle signatures; `None` until validator `i` votes.
    pub oracle_signatures: Vec<Option<Vec<u8>>>,
}

impl FnExecutionResponse {
    /// Build an empty aggregate with `slots` signature slots.
    pub fn new(status: i32, error: impl Into<String>, hash: Vec<u8>, slots: usize) -> Self {
        Self {
            status,
            error: error.into(),
            hash,
            oracle_signatures: vec![None; slots],
        }
    }

    /// Canonical equality: status, error, hash, and slot count.  Signature
    /// bits are deliberately excluded — two honest replicas differ only
    /// there.
    pub fn canonical_eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.error == other.error
            && self.hash == other.hash
            && self.oracle_signatures.len() == other.oracle_signatures.len()
    }

    /// Whether an individual response may be folded into this aggregate.
    pub fn compatible_with(&self, individual: &FnIndividualExecutionResponse) -> bool {
        self.status == individual.status
            && self.error == individual.error
            && self.hash == individual.hash
    }

    /// Place an oracle signature into slot `slot`.
    pub fn add_signature(&mut self, slot: usize, signature: Vec<u8>) -> Result<()> {
        let entry = self
            .oracle_signatures
            .get_mut(slot)
            .ok_or(ConsensusError::VoteNotPresent { slot })?;
        if entry.is_some() {
            return Err(ConsensusError::ResponseSignatureAlreadyPresent { slot });
        }
        *entry = Some(signature);
        Ok(())
    }

    /// Clear slot `slot`; used to roll back a partially applied vote.
    pub(crate) fn clear_signature(&mut self, slot: usize) {
        if let Some(entry) = self.oracle_signatures.get_mut(slot) {
            *entry = None;
        }
    }

    /// The single-validator view of slot `slot`.  Errors if the slot is
    /// empty — a validator only ever signs a slot it has filled.
    pub fn individual_view(&self, slot: usize) -> Result<FnIndividualExecutionResponse> {
        let signature = self
            .oracle_signatures
            .get(slot)
            .and_then(|s| s.as_ref())
            .ok_or(ConsensusError::VoteNotPresent { slot })?;
        Ok(FnIndividualExecutionResponse {
            status: self.status,
            error: self.error.clone(),
            hash: self.hash.clone(),
            oracle_signature: signature.clone(),
        })
    }

    /// Sign-bytes for slot `slot`: the encoding of the single-validator
    /// view, so a signature cannot be replayed into another slot.
    pub fn sign_bytes(&self, slot: usize) -> Result<Vec<u8>> {
        self.individual_view(slot)?.sign_bytes()
    }

    /// Structural validity against a validator-set snapshot.
    pub fn is_valid(&self, snapshot: &ValidatorSet) -> bool {
        !self.hash.is_empty() && self.oracle_signatures.len() == snapshot.size()
    }
}

/// The request/response pair carried by a vote set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnVotePayload {
    /// What was executed.
    pub request: FnExecutionRequest,
    /// The accumulating aggregate result.
    pub response: FnExecutionResponse,
}

impl FnVotePayload {
    /// Pair a request with its aggregate response.
    pub fn new(request: FnExecutionRequest, response: FnExecutionResponse) -> Self {
        Self { request, response }
    }

    /// Canonical equality: conjunction of request and response.
    pub fn canonical_eq(&self, other: &Self) -> bool {
        self.request.canonical_eq(&other.request) && self.response.canonical_eq(&other.response)
    }

    /// Structural validity against a snapshot.
    pub fn is_valid(&self, snapshot: &ValidatorSet) -> bool {
        !self.request.fn_id.is_empty() && self.response.is_valid(snapshot)
    }

    /// Per-slot sign-bytes: request encoding followed by the response's
    /// slot sign-bytes.
    pub fn sign_bytes(&self, slot: usize) -> Result<Vec<u8>> {
        let mut out = self.request.sign_bytes()?;
        out.extend(self.response.sign_bytes(slot)?);
        Ok(out)
    }
}
