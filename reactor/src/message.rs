//! Wire message for the two gossip channels.
//!
//! Every frame on channels `0x50`/`0x51` is a length-prefixed encoding of
//! [`ReactorMessage`].  The enum tag is what makes unknown message kinds a
//! decode error rather than a silent misread.

use {
    oraclenet_consensus::{codec, FnVoteSet, Result},
    serde::{Deserialize, Serialize},
};

/// Top-level gossip message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReactorMessage {
    /// A vote set, in progress or finalized depending on the channel.
    VoteSet(FnVoteSet),
}

impl ReactorMessage {
    /// Encode with the length-prefixed framing used on the wire and for
    /// persistence.
    pub fn encode_framed(&self, max_size: usize) -> Result<Vec<u8>> {
        codec::encode_framed(self, max_size)
    }

    /// Decode a framed message.
    pub fn decode_framed(bytes: &[u8], max_size: usize) -> Result<Self> {
        codec::decode_framed(bytes, max_size)
    }

    /// Human-readable tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VoteSet(_) => "vote_set",
        }
    }
}
