//! Identifier Allocation
//!
//! Anchor ids are 5-character tokens over `[A-Z0-9]`. Position ids prefix the
//! anchor id with the level and breadth letter: level 2, breadth A, anchor
//! `X7Y3Z` gives `2A-X7Y3Z`.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use fractal_history_core::{Breadth, ROOT_ID};

/// Length of a minted anchor id
pub const ANCHOR_ID_LEN: usize = 5;

const ANCHOR_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static LEVEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[A-Za-z]-").expect("valid level prefix regex"));

/// Tree level encoded in an identifier.
///
/// The root maps to 0, `<digits><letter>-...` to the parsed digits, and any
/// other identifier (a bare anchor id) to level 1.
pub fn derive_level(id: &str) -> u32 {
    if id == ROOT_ID {
        return 0;
    }
    LEVEL_PREFIX
        .captures(id)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(1)
}

/// Mint a fresh anchor id. Collisions are not checked here; a primary-key
/// conflict on insert means "mint again".
pub fn mint_anchor_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ANCHOR_ID_LEN)
        .map(|_| ANCHOR_ID_ALPHABET[rng.gen_range(0..ANCHOR_ID_ALPHABET.len())] as char)
        .collect()
}

/// Compose a position id from level, breadth and anchor id.
///
/// The root breadth has no letter; the root position id is the root sentinel.
pub fn mint_position_id(level: u32, breadth: Breadth, anchor_id: &str) -> String {
    match breadth.letter() {
        Some(letter) => format!("{}{}-{}", level, letter, anchor_id),
        None => ROOT_ID.to_string(),
    }
}
