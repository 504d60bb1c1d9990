//! Index selection for next/previous

use crate::types::{Direction, PlayMode};
use rand::Rng;

/// Index to move to from `current`, or `None` for an empty playlist
///
/// Shuffle picks uniformly over the whole playlist, current index
/// included. Every other mode steps by one with wraparound; `RepeatOne`
/// only differs on natural end-of-track, which callers handle before
/// asking for a new index.
pub fn next_index<R: Rng + ?Sized>(
    mode: PlayMode,
    direction: Direction,
    current: usize,
    len: usize,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let index = match (mode, direction) {
        (PlayMode::Shuffle, _) => rng.gen_range(0..len),
        (_, Direction::Forward) => (current + 1) % len,
        (_, Direction::Backward) => (current % len + len - 1) % len,
    };
    Some(index)
}
