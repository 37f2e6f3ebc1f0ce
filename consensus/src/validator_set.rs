//! Weighted validator-set snapshot.
//!
//! The host chain elects the roster; this type is the reactor's read-only
//! view of it.  Ordering is deterministic (power descending, pubkey
//! ascending on ties) so every node derives the same slot index for the
//! same validator, which is what makes positional vote-set arrays work.

use {
    solana_pubkey::Pubkey,
    std::collections::HashMap,
};

/// A single validator with its voting power.  The pubkey doubles as the
/// validator address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    pub pubkey: Pubkey,
    pub power: u64,
}

/// An ordered, weighted snapshot of the validator roster.
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    /// Validators sorted by power (descending), then pubkey (ascending).
    validators: Vec<Validator>,
    /// Pubkey -> slot index lookup.
    index: HashMap<Pubkey, usize>,
    /// Sum of all voting power.
    total_power: u64,
    /// Host-designated proposer for the current round, if any.
    proposer: Option<Pubkey>,
}

impl ValidatorSet {
    /// Create a snapshot from `(pubkey, power)` pairs.  Zero-power entries
    /// are dropped and the rest sorted deterministically.
    pub fn new(validators: Vec<(Pubkey, u64)>) -> Self {
        let mut infos: Vec<Validator> = validators
            .into_iter()
            .filter(|(_, power)| *power > 0)
            .map(|(pubkey, power)| Validator { pubkey, power })
            .collect();

        infos.sort_by(|a, b| b.power.cmp(&a.power).then_with(|| a.pubkey.cmp(&b.pubkey)));

        let total_power = infos.iter().map(|v| v.power).sum();
        let index = infos
            .iter()
            .enumerate()
            .map(|(i, v)| (v.pubkey, i))
            .collect();

        Self {
            validators: infos,
            index,
            total_power,
            proposer: None,
        }
    }

    /// Record the proposer the host elected for this round.
    pub fn with_proposer(mut self, pubkey: Pubkey) -> Self {
        self.proposer = Some(pubkey);
        self
    }

    /// Number of validators.
    pub fn size(&self) -> usize {
        self.validators.len()
    }

    /// True if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Sum of voting power across the roster.
    pub fn total_voting_power(&self) -> u64 {
        self.total_power
    }

    /// The current proposer: the host-designated one, falling back to the
    /// first validator in canonical order.
    pub fn proposer(&self) -> Option<&Validator> {
        match self.proposer {
            Some(pk) => self.get_by_address(&pk).map(|(_, v)| v),
            None => self.validators.first(),
        }
    }

    /// Validator at slot `index`.
    pub fn get_by_index(&self, index: usize) -> Option<&Validator> {
        self.validators.get(index)
    }

    /// Look up a validator and its slot by address.
    pub fn get_by_address(&self, pubkey: &Pubkey) -> Option<(usize, &Validator)> {
        self.index.get(pubkey).map(|&i| (i, &self.validators[i]))
    }

    /// Voting power of a validator, or 0 if absent.
    pub fn power_of(&self, pubkey: &Pubkey) -> u64 {
        self.get_by_address(pubkey).map(|(_, v)| v.power).unwrap_or(0)
    }

    /// Whether the address belongs to the roster.
    pub fn contains(&self, pubkey: &Pubkey) -> bool {
        self.index.contains_key(pubkey)
    }

    /// Iterator over validators in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    /// Minimum voting power for a super-majority: strictly more than two
    /// thirds of the total, in integer arithmetic.
    pub fn maj23_threshold(&self) -> u64 {
        self.total_power * 2 / 3 + 1
    }
}
