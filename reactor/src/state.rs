//! Reactor state and its crash-safe persistence.
//!
//! Three keyed maps track every Fn's lifecycle: the in-flight set, the
//! last set that timed out, and the last set that finalized.  Retired
//! entries are kept for peer assistance and overwritten by the next round
//! of the same Fn.  The whole state persists under a single well-known
//! key; per-key atomicity of the backend is the crash-safety story.

use {
    crate::{
        error::Result,
        store::KvStore,
    },
    log::debug,
    oraclenet_consensus::{codec, FnVoteSet},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// The well-known key the encoded state lives under.
pub const REACTOR_STATE_KEY: &[u8] = b"oracle_reactor/state";

/// All vote-set state owned by the reactor, keyed by Fn id.
///
/// `BTreeMap` keeps both iteration and the persisted encoding in
/// ascending-FnID order, which every node must agree on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactorState {
    /// Rounds still collecting votes.
    pub current_vote_sets: BTreeMap<String, FnVoteSet>,
    /// Most recent round per Fn that expired without finalizing.
    pub previous_timed_out_vote_sets: BTreeMap<String, FnVoteSet>,
    /// Most recent round per Fn that reached super-majority.
    pub previous_maj23_vote_sets: BTreeMap<String, FnVoteSet>,
}

/// On-disk shape: three parallel sequences.  Fn ids are rederived from
/// each set's payload on load, so they are not stored twice.
#[derive(Serialize, Deserialize)]
struct PersistedReactorState {
    current: Vec<FnVoteSet>,
    timed_out: Vec<FnVoteSet>,
    maj23: Vec<FnVoteSet>,
}

fn to_sequence(map: &BTreeMap<String, FnVoteSet>) -> Vec<FnVoteSet> {
    map.values().cloned().collect()
}

fn from_sequence(sets: Vec<FnVoteSet>) -> BTreeMap<String, FnVoteSet> {
    sets.into_iter()
        .map(|set| (set.fn_id().to_string(), set))
        .collect()
}

impl ReactorState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode for persistence.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let persisted = PersistedReactorState {
            current: to_sequence(&self.current_vote_sets),
            timed_out: to_sequence(&self.previous_timed_out_vote_sets),
            maj23: to_sequence(&self.previous_maj23_vote_sets),
        };
        Ok(codec::encode_framed(&persisted, usize::MAX)?)
    }

    /// Decode a persisted state.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let persisted: PersistedReactorState = codec::decode_framed(bytes, usize::MAX)?;
        Ok(Self {
            current_vote_sets: from_sequence(persisted.current),
            previous_timed_out_vote_sets: from_sequence(persisted.timed_out),
            previous_maj23_vote_sets: from_sequence(persisted.maj23),
        })
    }
}

/// Persist `state` under the well-known key.
pub fn save_reactor_state(store: &dyn KvStore, state: &ReactorState) -> Result<()> {
    let bytes = state.encode()?;
    store.put(REACTOR_STATE_KEY, &bytes)?;
    debug!(
        "persisted reactor state ({} current, {} timed-out, {} maj23)",
        state.current_vote_sets.len(),
        state.previous_timed_out_vote_sets.len(),
        state.previous_maj23_vote_sets.len()
    );
    Ok(())
}

/// Load the persisted state.  A missing record yields an empty state; a
/// corrupted one is an error, fatal to reactor start.
pub fn load_reactor_state(store: &dyn KvStore) -> Result<ReactorState> {
    match store.get(REACTOR_STATE_KEY)? {
        None => Ok(ReactorState::new()),
        Some(bytes) => ReactorState::decode(&bytes),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::store::MemoryKvStore,
        oraclenet_consensus::{
            message_digest, FnExecutionRequest, FnExecutionResponse, FnVotePayload, ValidatorSet,
        },
        solana_keypair::Keypair,
        solana_signer::Signer,
    };

    fn vote_set_for(fn_id: &str) -> FnVoteSet {
        let key = Keypair::new();
        let snapshot = ValidatorSet::new(vec![(key.pubkey(), 1)]);
        let mut response = FnExecutionResponse::new(0, "", message_digest(b"m"), 1);
        response.add_signature(0, b"osig".to_vec()).unwrap();
        FnVoteSet::new(
            "oraclenet-test",
            1_700_000_000,
            0,
            b"ctx".to_vec(),
            FnVotePayload::new(FnExecutionRequest::new(fn_id), response),
            &key,
            &snapshot,
        )
        .unwrap()
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = MemoryKvStore::new();
        let state = load_reactor_state(&store).unwrap();
        assert_eq!(state, ReactorState::new());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryKvStore::new();
        let mut state = ReactorState::new();
        state
            .current_vote_sets
            .insert("alpha".to_string(), vote_set_for("alpha"));
        state
            .previous_timed_out_vote_sets
            .insert("beta".to_string(), vote_set_for("beta"));
        state
            .previous_maj23_vote_sets
            .insert("gamma".to_string(), vote_set_for("gamma"));

        save_reactor_state(&store, &state).unwrap();
        let loaded = load_reactor_state(&store).unwrap();
        assert_eq!(state, loaded);
    }

    #[test]
    fn test_fn_id_rederived_from_payload() {
        let mut state = ReactorState::new();
        let set = vote_set_for("alpha");
        state.current_vote_sets.insert("alpha".to_string(), set);

        let decoded = ReactorState::decode(&state.encode().unwrap()).unwrap();
        assert!(decoded.current_vote_sets.contains_key("alpha"));
    }

    #[test]
    fn test_corrupted_record_fails() {
        let store = MemoryKvStore::new();
        store
            .put(REACTOR_STATE_KEY, &[0xde, 0xad, 0xbe, 0xef, 0x01, 0x02])
            .unwrap();
        assert!(load_reactor_state(&store).is_err());
    }
}
