//! P2P channel layout.
//!
//! The reactor speaks two channels: in-progress vote sets gossip on the
//! regular channel, finalized sets on the Maj23 channel.  The split lets
//! receivers terminate gossip quickly on finality and reject misplaced
//! messages as protocol violations.  Priorities sit well below the host
//! chain's own consensus traffic so this subsystem can never starve it.

use crate::config::ReactorConfig;

/// Channel carrying in-progress vote sets.
pub const VOTE_SET_CHANNEL_ID: u8 = 0x50;

/// Channel carrying finalized (Maj23) vote sets.
pub const MAJ23_CHANNEL_ID: u8 = 0x51;

/// Descriptor the host P2P layer uses to provision a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Channel byte on the wire.
    pub id: u8,
    /// Relative send priority; higher drains first.
    pub priority: u8,
    /// Outbound queue depth before sends start failing.
    pub send_queue_capacity: usize,
    /// Largest frame accepted on this channel.
    pub max_message_size: usize,
}

/// The channels this reactor registers with the host.
pub fn channel_descriptors(config: &ReactorConfig) -> Vec<ChannelDescriptor> {
    vec![
        ChannelDescriptor {
            id: VOTE_SET_CHANNEL_ID,
            priority: 25,
            send_queue_capacity: config.channel_send_queue_capacity,
            max_message_size: config.max_message_bytes,
        },
        ChannelDescriptor {
            id: MAJ23_CHANNEL_ID,
            priority: 26,
            send_queue_capacity: config.channel_send_queue_capacity,
            max_message_size: config.max_message_bytes,
        },
    ]
}
