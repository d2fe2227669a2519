//! Opaque tracking handles for public, unauthenticated status lookups.

use rand::RngCore;

/// 12 hex characters = 48 bits of entropy. Collisions are negligible at this
/// scale and the storage layer's unique constraint catches the rest.
pub const TRACKING_CODE_LEN: usize = 12;

/// Mint a fresh tracking handle from OS-seeded randomness. Never derived from
/// the applicant's email or the clock; the handle must not be guessable.
pub fn new_tracking_code() -> String {
    let mut bytes = [0u8; TRACKING_CODE_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
