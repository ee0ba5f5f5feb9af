//! Entity key generation.
//!
//! Records in the external tree are keyed by opaque 40-char lowercase hex
//! strings. Keys are generated client-side; the tree has no auto-id.

use rand::RngCore;

/// Random bytes per key (40 hex chars).
const KEY_BYTES: usize = 20;

/// Generate a fresh entity key.
pub fn new_entity_id() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
