//! Room code generation.
//!
//! Room codes are short opaque tokens handed out by the invite bot; they use
//! Crockford's Base32 alphabet to stay unambiguous in chat messages.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const ROOM_CODE_LEN: usize = 8;

/// Generate a fresh 8-character room code.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    let mut s = String::with_capacity(ROOM_CODE_LEN);
    for _ in 0..ROOM_CODE_LEN {
        s.push(CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char);
    }
    s
}
