// ELO-style rating calculation.
//
// Working ratings move after every match inside an event; durable ratings
// only change when the event's ratings are applied.

use crate::models::{Event, EventError, Player, ELITE_RATING};
use serde::{Deserialize, Serialize};

// K-factor thresholds
const K_PROVISIONAL_GAMES: u32 = 30;
const K_PROVISIONAL_CEILING: i32 = 2300;

const K_PROVISIONAL: f64 = 40.0;
const K_ESTABLISHED: f64 = 20.0;
const K_ELITE: f64 = 10.0;

/// Match outcome from the perspective of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
        }
    }
}

/// K-factor from the player's durable rating and match history.
pub fn k_factor(player: &Player) -> f64 {
    if player.rating < K_PROVISIONAL_CEILING && player.matches_played < K_PROVISIONAL_GAMES {
        K_PROVISIONAL
    } else if player.is_elite() {
        K_ELITE
    } else {
        K_ESTABLISHED
    }
}

/// Expected score for a player rated `rating_a` against `rating_b`.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((f64::from(rating_b) - f64::from(rating_a)) / 400.0))
}

/// New rating after one match.
pub fn calculate_new_rating(rating: i32, opponent_rating: i32, outcome: Outcome, k: f64) -> i32 {
    let expected = expected_score(rating, opponent_rating);
    (f64::from(rating) + k * (outcome.score() - expected)).round() as i32
}

/// Copy every entrant's working rating into the durable player record.
///
/// Rejected if ratings were already applied, nothing was played, or any match is still open. Adds the
/// event's matches to each player's history and sets the elite flag when earned.
pub fn apply_event_ratings(event: &mut Event, players: &mut [Player]) -> Result<(), EventError> {
    if event.ratings_applied {
        return Err(EventError::RatingsAlreadyApplied);
    }
    if event.matches.is_empty() {
        return Err(EventError::NoMatchesPlayed);
    }
    if event.has_pending_matches() {
        return Err(EventError::PendingMatches);
    }

    for rank in &event.entrants {
        let player = players
            .iter_mut()
            .find(|p| p.id == rank.player_id)
            .ok_or(EventError::PlayerNotFound(rank.player_id))?;
        player.rating = rank.temp_rating();
        player.matches_played += rank.matches_played();
        if rank.temp_rating() >= ELITE_RATING {
            player.reached_elite_rating = true;
        }
    }
    event.ratings_applied = true;
    Ok(())
}
