//! How many players advance out of a qualifying stage, and how many byes the bracket needs.

use serde::{Deserialize, Serialize};

/// Fields up to this size advance in full.
pub const FULL_ADVANCEMENT_LIMIT: usize = 32;
/// Mid-size fields below this size still advance in full.
pub const MID_FIELD_CUT_START: usize = 40;
/// Upper bound of the mid-size band.
pub const MID_FIELD_LIMIT: usize = 64;

/// Advancement figures for one field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Advancement {
    pub players_advancing: usize,
    /// Top seeds who skip the first knockout round.
    pub bye_count: usize,
}

impl Advancement {
    pub fn for_field(total_players: usize) -> Self {
        let players_advancing = players_advancing(total_players);
        Self {
            players_advancing,
            bye_count: bye_count(players_advancing),
        }
    }

    /// Matches in the first knockout round.
    pub fn first_round_matches(&self) -> usize {
        (self.players_advancing - self.bye_count) / 2
    }
}

/// Players who make the cut out of `total_players`. Cuts drop the bottom 20%, rounding down.
pub fn players_advancing(total_players: usize) -> usize {
    let keeps_everyone = total_players <= FULL_ADVANCEMENT_LIMIT
        || (total_players <= MID_FIELD_LIMIT && total_players < MID_FIELD_CUT_START);
    if keeps_everyone {
        total_players
    } else {
        total_players * 4 / 5
    }
}

/// Largest power of two not above `n` (0 for 0).
pub fn largest_power_of_two_at_most(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Byes for `advancing` players so that round two has a power-of-two field.
pub fn bye_count(advancing: usize) -> usize {
    if advancing == 0 || advancing.is_power_of_two() {
        return 0;
    }
    let target = largest_power_of_two_at_most(advancing);
    let matches_needed = advancing - target;
    advancing - matches_needed * 2
}
