//! Match results: scores, completion and the entrants' working ratings.

use crate::logic::rating::{calculate_new_rating, k_factor, Outcome};
use crate::models::{Event, EventError, GameMatch, MatchId, Player, PlayerId};

/// Update the scores of an open match without finishing it.
pub fn update_match_scores(
    event: &mut Event,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<(), EventError> {
    event.ensure_open()?;
    event
        .get_match_mut(match_id)
        .ok_or(EventError::MatchNotFound(match_id))?
        .set_scores(score_1, score_2)
}

/// Finish a match with the given scores and apply it to both entrants.
///
/// The winner gains a win, `5 × points won − points lost` score and a new working
/// rating; the loser gains a loss, loses the points conceded and gets a new working
/// rating. K-factors come from `lookup`, which returns the durable player records.
pub fn record_match_result<F>(
    event: &mut Event,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
    lookup: F,
) -> Result<(), EventError>
where
    F: Fn(PlayerId) -> Result<Player, EventError>,
{
    event.ensure_open()?;
    let mut finished: GameMatch = event
        .get_match(match_id)
        .ok_or(EventError::MatchNotFound(match_id))?
        .clone();
    finished.set_scores(score_1, score_2)?;
    finished.finish()?;

    let (winner_id, loser_id) = finished.winner().zip(finished.loser()).ok_or_else(|| {
        EventError::InvariantViolation(format!("finished match {match_id} has no winner"))
    })?;
    let (winner_points, loser_points) = finished
        .points_for(winner_id)
        .ok_or(EventError::MatchUnscored(match_id))?;

    let winner = lookup(winner_id)?;
    let loser = lookup(loser_id)?;
    apply_match_result(event, &winner, &loser, winner_points, loser_points)?;

    let stage = finished.stage;
    if let Some(slot) = event.get_match_mut(match_id) {
        *slot = finished;
    }
    event.refresh_stage_completion(stage);

    log::debug!(
        "Event {}: match {} won by {} ({}-{})",
        event.id,
        match_id,
        winner_id,
        winner_points,
        loser_points
    );
    Ok(())
}

/// Move both entrants' working ratings, using each other's current working rating.
fn apply_match_result(
    event: &mut Event,
    winner: &Player,
    loser: &Player,
    winner_points: u32,
    loser_points: u32,
) -> Result<(), EventError> {
    let winner_rating = event
        .entrant(winner.id)
        .ok_or(EventError::EntrantNotFound(winner.id))?
        .temp_rating();
    let loser_rating = event
        .entrant(loser.id)
        .ok_or(EventError::EntrantNotFound(loser.id))?
        .temp_rating();

    let new_winner_rating =
        calculate_new_rating(winner_rating, loser_rating, Outcome::Win, k_factor(winner));
    let new_loser_rating =
        calculate_new_rating(loser_rating, winner_rating, Outcome::Loss, k_factor(loser));

    event
        .entrant_mut(winner.id)
        .ok_or(EventError::EntrantNotFound(winner.id))?
        .record_win(new_winner_rating, winner_points, loser_points);
    event
        .entrant_mut(loser.id)
        .ok_or(EventError::EntrantNotFound(loser.id))?
        .record_loss(new_loser_rating, winner_points);
    Ok(())
}
