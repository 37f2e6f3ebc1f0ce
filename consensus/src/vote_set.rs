//! The per-Fn vote set.
//!
//! An [`FnVoteSet`] accumulates validator contributions for one round of
//! one Fn.  Identity is positional: three `N`-sized arrays (bit array,
//! validator signatures, validator addresses) are indexed by validator
//! slot, so canonical comparison and the wire encoding never carry
//! validator references.  A set is created by the round's proposer (or on
//! arrival of a validated remote set), mutated only through [`add_vote`]
//! and [`merge`], and retired on super-majority or expiry.
//!
//! [`add_vote`]: FnVoteSet::add_vote
//! [`merge`]: FnVoteSet::merge

use {
    crate::{
        bitset::BitSet,
        error::{ConsensusError, Result},
        messages::{FnIndividualExecutionResponse, FnVotePayload},
        registry::FnRegistry,
        validator_set::ValidatorSet,
    },
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_signer::Signer,
};

/// Upper bound on the proposer-distributed execution context.
pub const MAX_EXECUTION_CONTEXT_BYTES: usize = 1024;

/// Separator between the header, context, and payload parts of the
/// sign-bytes preimage.
const SIGN_BYTES_SEPARATOR: [u8; 4] = [0x11, 0x13, 0x17, 0x1D];

/// Per-Fn tally of validator contributions for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnVoteSet {
    /// Chain this round belongs to.
    pub chain_id: String,
    /// Sum of voting power over contributing validators.
    pub total_voting_power: u64,
    /// Construction time, Unix seconds; binds signatures to the round.
    pub creation_time: i64,
    /// Bit `i` set ⇔ validator `i` has contributed.
    pub vote_bitarray: BitSet,
    /// The request/response pair under aggregation.
    pub payload: FnVotePayload,
    /// Proposer snapshot of the round's inputs, ≤ 1 KiB.
    pub execution_context: Vec<u8>,
    /// Validator `i`'s signature over the slot-`i` sign-bytes.
    pub validator_signatures: Vec<Option<Signature>>,
    /// Roster addresses frozen at construction.
    pub validator_addresses: Vec<Pubkey>,
}

impl FnVoteSet {
    /// Construct a fresh vote set carrying the local validator's own vote.
    ///
    /// `payload` must already hold the local oracle signature at
    /// `validator_index`; the constructor signs that slot and sets its bit.
    pub fn new(
        chain_id: impl Into<String>,
        creation_time: i64,
        validator_index: usize,
        execution_context: Vec<u8>,
        payload: FnVotePayload,
        signer: &dyn Signer,
        snapshot: &ValidatorSet,
    ) -> Result<Self> {
        if !payload.is_valid(snapshot) {
            return Err(ConsensusError::PayloadInvalid(
                "payload does not match validator snapshot".to_string(),
            ));
        }
        let own = snapshot
            .get_by_index(validator_index)
            .ok_or(ConsensusError::InvalidValidatorAddress {
                slot: validator_index,
            })?;
        if own.power == 0 {
            return Err(ConsensusError::InvalidValidatorAddress {
                slot: validator_index,
            });
        }

        let n = snapshot.size();
        let mut vote_bitarray = BitSet::new(n);
        vote_bitarray.set(validator_index, true);

        let mut set = Self {
            chain_id: chain_id.into(),
            total_voting_power: own.power,
            creation_time,
            vote_bitarray,
            payload,
            execution_context,
            validator_signatures: vec![None; n],
            validator_addresses: snapshot.iter().map(|v| v.pubkey).collect(),
        };

        let preimage = set.sign_bytes(validator_index)?;
        set.validator_signatures[validator_index] = Some(signer.try_sign_message(&preimage)?);
        Ok(set)
    }

    /// The Fn this set is tallying.
    pub fn fn_id(&self) -> &str {
        &self.payload.request.fn_id
    }

    /// Canonical sign-bytes for slot `slot`.
    ///
    /// The embedded address binds the signature to the slot, the creation
    /// time to the round, and the context to the proposer's snapshot.
    pub fn sign_bytes(&self, slot: usize) -> Result<Vec<u8>> {
        let address = self
            .validator_addresses
            .get(slot)
            .ok_or(ConsensusError::VoteNotPresent { slot })?;
        let mut out = format!(
            "CT:{}|CD:{}|VA:{}|PL:",
            self.creation_time, self.chain_id, address
        )
        .into_bytes();
        out.extend_from_slice(&SIGN_BYTES_SEPARATOR);
        out.extend_from_slice(&self.execution_context);
        out.extend_from_slice(&SIGN_BYTES_SEPARATOR);
        out.extend(self.payload.sign_bytes(slot)?);
        Ok(out)
    }

    /// Whether the validity window has elapsed at `now`.
    pub fn is_expired(&self, validity_secs: i64, now: i64) -> bool {
        now > self.creation_time.saturating_add(validity_secs)
    }

    /// Whether the contributed power is a super-majority of the snapshot.
    pub fn is_maj23(&self, snapshot: &ValidatorSet) -> bool {
        self.total_voting_power >= snapshot.maj23_threshold()
    }

    /// Merge compatibility: everything except the signature bits must
    /// agree.  Addresses are exempt so a set installed from the wire can
    /// be healed slot by slot.
    pub fn canonical_eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id
            && self.creation_time == other.creation_time
            && self.execution_context == other.execution_context
            && self.vote_bitarray.len() == other.vote_bitarray.len()
            && self.payload.canonical_eq(&other.payload)
    }

    /// Full validation of a received vote set against local knowledge.
    pub fn is_valid(
        &self,
        chain_id: &str,
        snapshot: &ValidatorSet,
        registry: &dyn FnRegistry,
        now: i64,
        validity_secs: i64,
    ) -> Result<()> {
        if !self.payload.is_valid(snapshot) {
            return Err(ConsensusError::PayloadInvalid(
                "payload does not match validator snapshot".to_string(),
            ));
        }
        if registry.get(self.fn_id()).is_none() {
            return Err(ConsensusError::InvalidFnId(self.fn_id().to_string()));
        }
        if self.chain_id != chain_id {
            return Err(ConsensusError::ChainIdMismatch {
                expected: chain_id.to_string(),
                got: self.chain_id.clone(),
            });
        }
        if self.is_expired(validity_secs, now) {
            return Err(ConsensusError::Expired {
                created: self.creation_time,
                now,
            });
        }

        let n = snapshot.size();
        for len in [
            self.vote_bitarray.len(),
            self.validator_signatures.len(),
            self.validator_addresses.len(),
        ] {
            if len != n {
                return Err(ConsensusError::RosterSizeMismatch {
                    expected: n,
                    got: len,
                });
            }
        }
        if self.execution_context.len() > MAX_EXECUTION_CONTEXT_BYTES {
            return Err(ConsensusError::ContextTooLarge {
                size: self.execution_context.len(),
                max: MAX_EXECUTION_CONTEXT_BYTES,
            });
        }

        let mut computed_power: u64 = 0;
        for (slot, validator) in snapshot.iter().enumerate() {
            if self.validator_addresses[slot] != validator.pubkey {
                return Err(ConsensusError::InvalidValidatorAddress { slot });
            }
            if !self.vote_bitarray.get(slot) {
                continue;
            }
            let signature = self.validator_signatures[slot]
                .ok_or(ConsensusError::VoteNotPresent { slot })?;
            let preimage = self.sign_bytes(slot)?;
            if !signature.verify(validator.pubkey.as_ref(), &preimage) {
                return Err(ConsensusError::InvalidSignature { slot });
            }
            computed_power = computed_power.saturating_add(validator.power);
        }
        if computed_power != self.total_voting_power {
            return Err(ConsensusError::VotingPowerMismatch {
                claimed: self.total_voting_power,
                computed: computed_power,
            });
        }
        Ok(())
    }

    /// Fold a peer's replica of this round into the local set.
    ///
    /// Every slot set in `other` but vacant here is copied over: validator
    /// signature, oracle-signature slot, and address.  The copied
    /// signature is re-verified against the local snapshot before being
    /// accepted, guarding against snapshot divergence between peers.
    /// Returns whether any slot was filled.
    pub fn merge(&mut self, other: &Self, snapshot: &ValidatorSet) -> Result<bool> {
        if !self.canonical_eq(other) {
            return Err(ConsensusError::MergeDiffPayload);
        }

        let mut changed = false;
        for slot in 0..self.vote_bitarray.len() {
            if self.vote_bitarray.get(slot) || !other.vote_bitarray.get(slot) {
                continue;
            }
            let signature = other.validator_signatures[slot]
                .ok_or(ConsensusError::VoteNotPresent { slot })?;
            let validator = snapshot
                .get_by_index(slot)
                .ok_or(ConsensusError::InvalidValidatorAddress { slot })?;
            let preimage = other.sign_bytes(slot)?;
            if !signature.verify(validator.pubkey.as_ref(), &preimage) {
                return Err(ConsensusError::InvalidSignature { slot });
            }
            let oracle_signature = other
                .payload
                .response
                .oracle_signatures
                .get(slot)
                .and_then(|s| s.clone())
                .ok_or(ConsensusError::VoteNotPresent { slot })?;

            self.payload.response.oracle_signatures[slot] = Some(oracle_signature);
            self.validator_signatures[slot] = Some(signature);
            self.validator_addresses[slot] = other.validator_addresses[slot];
            self.vote_bitarray.set(slot, true);
            self.total_voting_power = self.total_voting_power.saturating_add(validator.power);
            changed = true;
        }
        Ok(changed)
    }

    /// Cast the local validator's vote into slot `index`.
    pub fn add_vote(
        &mut self,
        individual: &FnIndividualExecutionResponse,
        snapshot: &ValidatorSet,
        index: usize,
        signer: &dyn Signer,
    ) -> Result<()> {
        if index >= self.vote_bitarray.len() {
            return Err(ConsensusError::InvalidValidatorAddress { slot: index });
        }
        if self.vote_bitarray.get(index) {
            return Err(ConsensusError::VoteAlreadyCast { slot: index });
        }
        if !self.payload.response.compatible_with(individual) {
            return Err(ConsensusError::PayloadInvalid(
                "individual response incompatible with aggregate".to_string(),
            ));
        }
        let validator = snapshot
            .get_by_index(index)
            .ok_or(ConsensusError::InvalidValidatorAddress { slot: index })?;
        if validator.pubkey != self.validator_addresses[index] {
            return Err(ConsensusError::InvalidValidatorAddress { slot: index });
        }

        self.payload
            .response
            .add_signature(index, individual.oracle_signature.clone())?;

        // The sign-bytes cover the oracle signature just placed; roll the
        // slot back if signing cannot complete.
        let signature = self
            .sign_bytes(index)
            .and_then(|preimage| Ok(signer.try_sign_message(&preimage)?));
        let signature = match signature {
            Ok(sig) => sig,
            Err(e) => {
                self.payload.response.clear_signature(index);
                return Err(e);
            }
        };

        self.vote_bitarray.set(index, true);
        self.validator_signatures[index] = Some(signature);
        self.total_voting_power = self.total_voting_power.saturating_add(validator.power);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            codec,
            digest::message_digest,
            messages::{FnExecutionRequest, FnExecutionResponse},
            registry::{FnResult, InMemoryFnRegistry, OracleFn},
        },
        assert_matches::assert_matches,
        solana_keypair::Keypair,
        std::sync::Arc,
    };

    const CHAIN: &str = "oraclenet-test";
    const FN_ID: &str = "price-feed";
    const T0: i64 = 1_700_000_000;

    struct StubFn;

    impl OracleFn for StubFn {
        fn prepare_context(&self) -> FnResult<Vec<u8>> {
            Ok(b"ctx".to_vec())
        }

        fn get_message_and_signature(&self, _ctx: &[u8]) -> FnResult<(Vec<u8>, Vec<u8>)> {
            Ok((b"message".to_vec(), b"osig".to_vec()))
        }

        fn map_message(&self, _ctx: &[u8], _hash: &[u8], _message: &[u8]) -> FnResult<()> {
            Ok(())
        }

        fn submit_multi_signed_message(
            &self,
            _ctx: &[u8],
            _hash: &[u8],
            _signatures: Vec<Option<Vec<u8>>>,
        ) {
        }
    }

    fn registry() -> InMemoryFnRegistry {
        let mut reg = InMemoryFnRegistry::new();
        reg.register(FN_ID, Arc::new(StubFn)).unwrap();
        reg
    }

    /// N equal-power validators; keypairs returned in arbitrary order.
    fn make_validators(n: usize) -> (Vec<Keypair>, ValidatorSet) {
        let keys: Vec<Keypair> = (0..n).map(|_| Keypair::new()).collect();
        let vs = ValidatorSet::new(keys.iter().map(|k| (k.pubkey(), 1)).collect());
        (keys, vs)
    }

    /// The keypair occupying `slot` in the sorted snapshot.
    fn signer_for<'a>(keys: &'a [Keypair], vs: &ValidatorSet, slot: usize) -> &'a Keypair {
        let pk = vs.get_by_index(slot).unwrap().pubkey;
        keys.iter().find(|k| k.pubkey() == pk).unwrap()
    }

    fn payload_with_slot(slot: usize, n: usize) -> FnVotePayload {
        let mut resp = FnExecutionResponse::new(0, "", message_digest(b"message"), n);
        resp.add_signature(slot, format!("osig-{slot}").into_bytes())
            .unwrap();
        FnVotePayload::new(FnExecutionRequest::new(FN_ID), resp)
    }

    fn individual(slot: usize) -> FnIndividualExecutionResponse {
        FnIndividualExecutionResponse {
            status: 0,
            error: String::new(),
            hash: message_digest(b"message"),
            oracle_signature: format!("osig-{slot}").into_bytes(),
        }
    }

    /// Vote set created by the validator at `slot`.
    fn make_vote_set(
        keys: &[Keypair],
        vs: &ValidatorSet,
        slot: usize,
        context: &[u8],
    ) -> FnVoteSet {
        FnVoteSet::new(
            CHAIN,
            T0,
            slot,
            context.to_vec(),
            payload_with_slot(slot, vs.size()),
            signer_for(keys, vs, slot),
            vs,
        )
        .unwrap()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn test_new_self_vote_invariants() {
        let (keys, vs) = make_validators(4);
        let set = make_vote_set(&keys, &vs, 1, b"ctx");

        assert_eq!(set.vote_bitarray.count_ones(), 1);
        assert!(set.vote_bitarray.get(1));
        assert_eq!(set.total_voting_power, 1);
        assert_eq!(set.validator_addresses.len(), 4);
        for (i, v) in vs.iter().enumerate() {
            assert_eq!(set.validator_addresses[i], v.pubkey);
        }

        // The stored signature verifies over the slot sign-bytes.
        let preimage = set.sign_bytes(1).unwrap();
        let sig = set.validator_signatures[1].unwrap();
        assert!(sig.verify(vs.get_by_index(1).unwrap().pubkey.as_ref(), &preimage));
        assert!(set.validator_signatures[0].is_none());
    }

    #[test]
    fn test_new_rejects_bad_payload() {
        let (keys, vs) = make_validators(4);
        // Payload sized for a different roster.
        let result = FnVoteSet::new(
            CHAIN,
            T0,
            0,
            vec![],
            payload_with_slot(0, 3),
            signer_for(&keys, &vs, 0),
            &vs,
        );
        assert_matches!(result, Err(ConsensusError::PayloadInvalid(_)));
    }

    #[test]
    fn test_new_rejects_out_of_range_index() {
        let (keys, vs) = make_validators(2);
        let result = FnVoteSet::new(
            CHAIN,
            T0,
            5,
            vec![],
            payload_with_slot(0, 2),
            &keys[0],
            &vs,
        );
        assert_matches!(
            result,
            Err(ConsensusError::InvalidValidatorAddress { slot: 5 })
        );
    }

    // ── AddVote ─────────────────────────────────────────────────────────

    #[test]
    fn test_add_vote_accumulates_power_and_signs() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");

        set.add_vote(&individual(2), &vs, 2, signer_for(&keys, &vs, 2))
            .unwrap();

        assert_eq!(set.total_voting_power, 2);
        assert!(set.vote_bitarray.get(2));
        let preimage = set.sign_bytes(2).unwrap();
        let sig = set.validator_signatures[2].unwrap();
        assert!(sig.verify(vs.get_by_index(2).unwrap().pubkey.as_ref(), &preimage));
    }

    #[test]
    fn test_add_vote_slot_exclusivity() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");
        let before = set.clone();

        let result = set.add_vote(&individual(0), &vs, 0, signer_for(&keys, &vs, 0));
        assert_matches!(result, Err(ConsensusError::VoteAlreadyCast { slot: 0 }));
        assert_eq!(set, before);
    }

    #[test]
    fn test_add_vote_incompatible_hash() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");
        let before = set.clone();

        let mut diverged = individual(1);
        diverged.hash = message_digest(b"something else");
        let result = set.add_vote(&diverged, &vs, 1, signer_for(&keys, &vs, 1));
        assert_matches!(result, Err(ConsensusError::PayloadInvalid(_)));
        assert_eq!(set, before);
    }

    #[test]
    fn test_add_vote_roster_mismatch() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");

        // A different roster of the same size: addresses won't line up.
        let (other_keys, other_vs) = make_validators(4);
        let result = set.add_vote(&individual(1), &other_vs, 1, &other_keys[1]);
        assert_matches!(result, Err(ConsensusError::InvalidValidatorAddress { .. }));
    }

    // ── Merge ───────────────────────────────────────────────────────────

    #[test]
    fn test_merge_copies_missing_slots() {
        let (keys, vs) = make_validators(4);
        let base = make_vote_set(&keys, &vs, 0, b"ctx");

        let mut theirs = base.clone();
        theirs
            .add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();

        let mut ours = base;
        let changed = ours.merge(&theirs, &vs).unwrap();
        assert!(changed);
        assert!(ours.vote_bitarray.get(0));
        assert!(ours.vote_bitarray.get(1));
        assert_eq!(ours.total_voting_power, 2);
        assert_eq!(
            ours.payload.response.oracle_signatures[1],
            Some(b"osig-1".to_vec())
        );
    }

    #[test]
    fn test_merge_idempotent() {
        let (keys, vs) = make_validators(4);
        let base = make_vote_set(&keys, &vs, 0, b"ctx");
        let mut theirs = base.clone();
        theirs
            .add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();

        let mut ours = base.clone();
        assert!(ours.merge(&theirs, &vs).unwrap());
        let snapshot_after = ours.clone();
        // Merging the same set again changes nothing.
        assert!(!ours.merge(&theirs, &vs).unwrap());
        assert_eq!(ours, snapshot_after);
        // Self-merge is a no-op.
        let clone = ours.clone();
        assert!(!ours.merge(&clone, &vs).unwrap());
    }

    #[test]
    fn test_merge_commutative_bits() {
        let (keys, vs) = make_validators(4);
        let base = make_vote_set(&keys, &vs, 0, b"ctx");
        let mut bigger = base.clone();
        bigger
            .add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();

        let mut ab = base.clone();
        ab.merge(&bigger, &vs).unwrap();
        let mut ba = bigger.clone();
        ba.merge(&base, &vs).unwrap();

        assert!(ab.canonical_eq(&ba));
        let bits_ab: Vec<usize> = ab.vote_bitarray.iter_ones().collect();
        let bits_ba: Vec<usize> = ba.vote_bitarray.iter_ones().collect();
        assert_eq!(bits_ab, bits_ba);
        assert_eq!(ab.total_voting_power, ba.total_voting_power);
    }

    #[test]
    fn test_merge_rejects_divergent_context() {
        let (keys, vs) = make_validators(4);
        let mut ours = make_vote_set(&keys, &vs, 0, b"ctx-a");
        let theirs = make_vote_set(&keys, &vs, 1, b"ctx-b");
        let before = ours.clone();

        assert_matches!(
            ours.merge(&theirs, &vs),
            Err(ConsensusError::MergeDiffPayload)
        );
        assert_eq!(ours, before);
    }

    #[test]
    fn test_merge_reverifies_copied_signature() {
        let (keys, vs) = make_validators(4);
        let base = make_vote_set(&keys, &vs, 0, b"ctx");
        let mut theirs = base.clone();
        theirs
            .add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();
        // Corrupt the slot-1 signature: replay slot 0's signature there.
        theirs.validator_signatures[1] = theirs.validator_signatures[0];

        let mut ours = base;
        assert_matches!(
            ours.merge(&theirs, &vs),
            Err(ConsensusError::InvalidSignature { slot: 1 })
        );
    }

    // ── Maj23 / expiry ──────────────────────────────────────────────────

    #[test]
    fn test_maj23_three_of_four() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");
        assert!(!set.is_maj23(&vs));
        set.add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();
        assert!(!set.is_maj23(&vs));
        set.add_vote(&individual(2), &vs, 2, signer_for(&keys, &vs, 2))
            .unwrap();
        assert!(set.is_maj23(&vs));
    }

    #[test]
    fn test_expiry_boundary() {
        let (keys, vs) = make_validators(1);
        let set = make_vote_set(&keys, &vs, 0, b"ctx");
        let validity = 119;
        assert!(!set.is_expired(validity, T0 + validity - 1));
        assert!(!set.is_expired(validity, T0 + validity));
        assert!(set.is_expired(validity, T0 + validity + 1));
    }

    // ── Validation ──────────────────────────────────────────────────────

    #[test]
    fn test_is_valid_accepts_honest_set() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");
        set.add_vote(&individual(3), &vs, 3, signer_for(&keys, &vs, 3))
            .unwrap();
        set.is_valid(CHAIN, &vs, &registry(), T0 + 1, 119).unwrap();
    }

    #[test]
    fn test_is_valid_rejections() {
        let (keys, vs) = make_validators(4);
        let reg = registry();
        let set = make_vote_set(&keys, &vs, 0, b"ctx");

        // Wrong chain.
        assert_matches!(
            set.is_valid("other-chain", &vs, &reg, T0 + 1, 119),
            Err(ConsensusError::ChainIdMismatch { .. })
        );

        // Expired.
        assert_matches!(
            set.is_valid(CHAIN, &vs, &reg, T0 + 120, 119),
            Err(ConsensusError::Expired { .. })
        );

        // Unknown Fn.
        let empty_reg = InMemoryFnRegistry::new();
        assert_matches!(
            set.is_valid(CHAIN, &vs, &empty_reg, T0 + 1, 119),
            Err(ConsensusError::InvalidFnId(_))
        );

        // Roster size mismatch.
        let (_, smaller) = make_validators(3);
        assert_matches!(
            set.is_valid(CHAIN, &smaller, &reg, T0 + 1, 119),
            Err(ConsensusError::PayloadInvalid(_))
        );

        // Claimed power inflated.
        let mut inflated = set.clone();
        inflated.total_voting_power = 4;
        assert_matches!(
            inflated.is_valid(CHAIN, &vs, &reg, T0 + 1, 119),
            Err(ConsensusError::VotingPowerMismatch {
                claimed: 4,
                computed: 1
            })
        );

        // Tampered signature.
        let mut forged = set.clone();
        forged.vote_bitarray.set(1, true);
        forged.validator_signatures[1] = forged.validator_signatures[0];
        forged.payload.response.oracle_signatures[1] = Some(b"osig-1".to_vec());
        assert_matches!(
            forged.is_valid(CHAIN, &vs, &reg, T0 + 1, 119),
            Err(ConsensusError::InvalidSignature { slot: 1 })
        );

        // Addresses not matching the snapshot.
        let mut shuffled = set.clone();
        shuffled.validator_addresses.swap(2, 3);
        assert_matches!(
            shuffled.is_valid(CHAIN, &vs, &reg, T0 + 1, 119),
            Err(ConsensusError::InvalidValidatorAddress { .. })
        );

        // Oversized execution context.
        let mut bloated = set.clone();
        bloated.execution_context = vec![0; MAX_EXECUTION_CONTEXT_BYTES + 1];
        assert_matches!(
            bloated.is_valid(CHAIN, &vs, &reg, T0 + 1, 119),
            Err(ConsensusError::ContextTooLarge { .. })
        );
    }

    #[test]
    fn test_roundtrip() {
        let (keys, vs) = make_validators(4);
        let mut set = make_vote_set(&keys, &vs, 0, b"ctx");
        set.add_vote(&individual(1), &vs, 1, signer_for(&keys, &vs, 1))
            .unwrap();

        let bytes = codec::encode(&set).unwrap();
        let decoded: FnVoteSet = codec::decode(&bytes).unwrap();
        assert_eq!(set, decoded);
    }
}
