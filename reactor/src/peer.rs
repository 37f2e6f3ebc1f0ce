//! Peer handle supplied by the host P2P framework.

use solana_pubkey::Pubkey;

/// An outbound handle to a connected peer.
///
/// The host P2P layer owns connection lifecycle; the reactor only ever
/// sends.  Frames passed to [`try_send`] are owned copies — the reactor
/// never hands a peer a buffer it will mutate later.
///
/// [`try_send`]: Peer::try_send
pub trait Peer: Send + Sync {
    /// Stable identity of the peer node.
    fn id(&self) -> Pubkey;

    /// Queue a frame on the given channel.  Returns false if the send
    /// queue is full or the connection is gone; the reactor treats that
    /// as best-effort gossip loss.
    fn try_send(&self, channel_id: u8, msg: Vec<u8>) -> bool;
}
