//! Player data structure and rating thresholds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Rating every new player starts with.
pub const STARTING_RATING: i32 = 1700;

/// Rating at which a player is considered elite. Once reached, the flag sticks.
pub const ELITE_RATING: i32 = 2400;

/// A player known to the system, independent of any event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Durable rating. Only changed when an event's ratings are applied.
    pub rating: i32,
    pub reached_elite_rating: bool,
    pub matches_played: u32,
}

impl Player {
    /// Create a new player at the starting rating.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rating(name, STARTING_RATING)
    }

    /// Create a player with an explicit rating (imported players, tests).
    pub fn with_rating(name: impl Into<String>, rating: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating,
            reached_elite_rating: rating >= ELITE_RATING,
            matches_played: 0,
        }
    }

    /// Whether the player is at or has ever been at the elite rating.
    pub fn is_elite(&self) -> bool {
        self.reached_elite_rating || self.rating >= ELITE_RATING
    }
}
