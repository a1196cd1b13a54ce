//! PlayerRank: a player's standing within one event.

use crate::models::event::EventId;
use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Points a winner earns per point scored in a match.
pub const WIN_POINT_MULTIPLIER: i64 = 5;

/// One per (player, event). Updated after every match the player finishes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRank {
    pub player_id: PlayerId,
    pub event_id: EventId,
    pub win_count: u32,
    pub loss_count: u32,
    /// Cumulative points differential.
    pub score: i64,
    /// Working rating for the duration of the event. Seeded from the durable rating.
    temp_rating: i32,
}

impl PlayerRank {
    /// Register `player` for `event_id`, seeding the working rating from the durable one.
    pub fn new(player: &Player, event_id: EventId) -> Self {
        Self {
            player_id: player.id,
            event_id,
            win_count: 0,
            loss_count: 0,
            score: 0,
            temp_rating: player.rating,
        }
    }

    pub fn temp_rating(&self) -> i32 {
        self.temp_rating
    }

    /// Matches this entrant has finished in the event.
    pub fn matches_played(&self) -> u32 {
        self.win_count + self.loss_count
    }

    /// Record a won match: `points_won` by this player, `points_lost` conceded.
    pub fn record_win(&mut self, new_rating: i32, points_won: u32, points_lost: u32) {
        self.win_count += 1;
        self.score += WIN_POINT_MULTIPLIER * i64::from(points_won) - i64::from(points_lost);
        self.temp_rating = new_rating;
    }

    /// Record a lost match, conceding `points_lost`.
    pub fn record_loss(&mut self, new_rating: i32, points_lost: u32) {
        self.loss_count += 1;
        self.score -= i64::from(points_lost);
        self.temp_rating = new_rating;
    }
}
