//! Application-facing Fn interfaces.
//!
//! An [`OracleFn`] is a deterministic application routine: the proposer
//! snapshots its inputs into an execution context, every validator derives
//! the same message from that context, and the finalized multi-signature
//! is handed back through `submit_multi_signed_message`.  Fns are black
//! boxes to the reactor; their errors are logged and abandon the round.

use std::{collections::BTreeMap, sync::Arc};

use crate::error::{ConsensusError, Result};

/// Error type for application callbacks.
pub type FnError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for application callbacks.
pub type FnResult<T> = std::result::Result<T, FnError>;

/// A deterministic application routine subject to multi-party signing.
pub trait OracleFn: Send + Sync {
    /// Snapshot the round's inputs.  Must stay within the reactor's
    /// context limit (1 KiB).
    fn prepare_context(&self) -> FnResult<Vec<u8>>;

    /// Produce the message and the application's own signature over it.
    /// Deterministic: the same context must yield the same message on
    /// every validator.
    fn get_message_and_signature(&self, ctx: &[u8]) -> FnResult<(Vec<u8>, Vec<u8>)>;

    /// Cache the `hash -> message` binding for later replay.
    fn map_message(&self, ctx: &[u8], hash: &[u8], message: &[u8]) -> FnResult<()>;

    /// Receive the finalized aggregate.  Called exactly once per
    /// successfully finalized round; slots are `None` for validators that
    /// did not contribute.
    fn submit_multi_signed_message(
        &self,
        ctx: &[u8],
        hash: &[u8],
        signatures: Vec<Option<Vec<u8>>>,
    );
}

/// Lookup surface the reactor drives rounds from.
pub trait FnRegistry: Send + Sync {
    /// All registered Fn ids in ascending order.
    fn get_all(&self) -> Vec<String>;

    /// Resolve an Fn by id.
    fn get(&self, fn_id: &str) -> Option<Arc<dyn OracleFn>>;
}

/// A straightforward map-backed registry for tests and embedders that
/// assemble their Fn set at startup.
#[derive(Default)]
pub struct InMemoryFnRegistry {
    fns: BTreeMap<String, Arc<dyn OracleFn>>,
}

impl InMemoryFnRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an Fn under `fn_id`.  Ids are unique.
    pub fn register(&mut self, fn_id: impl Into<String>, f: Arc<dyn OracleFn>) -> Result<()> {
        let fn_id = fn_id.into();
        if self.fns.contains_key(&fn_id) {
            return Err(ConsensusError::FnAlreadyRegistered(fn_id));
        }
        self.fns.insert(fn_id, f);
        Ok(())
    }
}

impl FnRegistry for InMemoryFnRegistry {
    fn get_all(&self) -> Vec<String> {
        // BTreeMap iteration is already ascending.
        self.fns.keys().cloned().collect()
    }

    fn get(&self, fn_id: &str) -> Option<Arc<dyn OracleFn>> {
        self.fns.get(fn_id).cloned()
    }
}
