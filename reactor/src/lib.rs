//! oraclenet reactor
//!
//! The gossip reactor that drives oraclenet's multi-signature oracle
//! rounds on top of a host BFT chain.  The host supplies the validator
//! roster, the elected proposer, a signing key, a P2P layer, and a
//! key-value store; this crate supplies everything between a periodic
//! proposer tick and a finalized multi-signature handed back to the
//! application.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────────────────────────────────────────┐
//!  │  Host chain                                      │
//!  │  validator roster · proposer · signer · P2P      │
//!  └───────┬──────────────────────────┬───────────────┘
//!          │ tick thread              │ receive(chan, peer, bytes)
//!  ┌───────▼──────────────────────────▼───────────────┐
//!  │  Reactor                                         │
//!  │  • propose: Fn → context → message → vote set    │
//!  │  • receive: validate → merge → self-vote → Maj23 │
//!  │  • two channels: 0x50 in-progress, 0x51 final    │
//!  └───────┬──────────────────────────┬───────────────┘
//!          │ ReactorState             │ FnVoteSet core
//!  ┌───────▼─────────┐      ┌────────▼────────────────┐
//!  │  KvStore        │      │  oraclenet-consensus    │
//!  │  (sled/memory)  │      │  (pure state machine)   │
//!  └─────────────────┘      └─────────────────────────┘
//! ```
//!
//! ## Crate modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`channel`] | Gossip channel ids and descriptors |
//! | [`config`]  | `ReactorConfig` tunables and validation |
//! | [`error`]   | Crate-wide error enum |
//! | [`host`]    | Read-only host validator-state interface |
//! | [`message`] | Top-level wire message |
//! | [`peer`]    | Outbound peer handle interface |
//! | [`reactor`] | The reactor itself |
//! | [`state`]   | `ReactorState` and its persistence |
//! | [`store`]   | Key-value backends (memory, sled) |

pub mod channel;
pub mod config;
pub mod error;
pub mod host;
pub mod message;
pub mod peer;
pub mod reactor;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use channel::{channel_descriptors, ChannelDescriptor, MAJ23_CHANNEL_ID, VOTE_SET_CHANNEL_ID};
pub use config::{ConfigError, ReactorConfig};
pub use error::{ReactorError, Result};
pub use host::{HostState, HostStateReader};
pub use message::ReactorMessage;
pub use peer::Peer;
pub use reactor::Reactor;
pub use state::{load_reactor_state, save_reactor_state, ReactorState, REACTOR_STATE_KEY};
pub use store::{KvStore, MemoryKvStore, SledKvStore, StoreError};
