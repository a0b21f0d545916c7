//! # Guest Names
//!
//! Fallback display names for participants that join without one.

use rand::Rng;

const GUEST_PREFIX: &str = "User_";
const GUEST_SUFFIX_LEN: usize = 6;
const GUEST_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a pseudo-random guest name such as `User_k3x9qa`.
pub fn guest_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..GUEST_SUFFIX_LEN)
        .map(|_| GUEST_CHARSET[rng.gen_range(0..GUEST_CHARSET.len())] as char)
        .collect();
    format!("{GUEST_PREFIX}{suffix}")
}
