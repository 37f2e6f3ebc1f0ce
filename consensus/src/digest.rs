//! Message digest and defensive copy helpers.
//!
//! The reactor hands buffers into application callbacks; the slot-array
//! copy keeps a callback from observing later mutation of the aggregate.

use sha2::{Digest, Sha512};

/// SHA-512 digest of an Fn-produced message.  The digest is the key under
/// which the application caches the `hash -> message` binding.
pub fn message_digest(message: &[u8]) -> Vec<u8> {
    Sha512::digest(message).to_vec()
}

/// Deep copy of an oracle-signature slot array before it crosses into an
/// application callback.
pub fn copy_signature_slots(slots: &[Option<Vec<u8>>]) -> Vec<Option<Vec<u8>>> {
    slots.to_vec()
}
