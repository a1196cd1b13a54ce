//! Knockout rounds: single-elimination bracket, seeded top vs. bottom.

use crate::logic::advancement::Advancement;
use crate::logic::ranking::sort_by_ranking;
use crate::models::{Event, EventError, GameMatch, KnockoutStage, PlayerId, StageId, StageRef};

/// Pair seed `i` with seed `k - 1 - i` for the first half of the list.
pub fn pair_top_bottom<T: Copy>(seeds: &[T]) -> Vec<(T, T)> {
    let k = seeds.len();
    (0..k / 2).map(|i| (seeds[i], seeds[k - 1 - i])).collect()
}

/// Append the next (empty) knockout round. The current latest round must already have matches.
pub fn create_knockout_stage(event: &mut Event) -> Result<StageId, EventError> {
    event.ensure_open()?;
    let round = match event.latest_knockout_stage() {
        Some(latest) => {
            if event.stage_matches(StageRef::Knockout(latest.id)).next().is_none() {
                return Err(EventError::StageNotSeeded(latest.id));
            }
            latest.round + 1
        }
        None => 1,
    };
    let stage = KnockoutStage::new(event.id, round);
    let id = stage.id;
    event.knockout_stages.push(stage);
    log::info!("Event {}: created knockout round {}", event.id, round);
    Ok(id)
}

/// Generate the matches of a knockout round.
///
/// The first round (no earlier round with matches) seeds the advancing entrants: the
/// top `bye_count` seeds get byes and the rest play top vs. bottom. Later rounds pair
/// the previous round's byes followed by its winners, in match order.
pub fn seed_knockout_stage(event: &mut Event, stage_id: StageId) -> Result<(), EventError> {
    event.ensure_open()?;
    let stage_ref = StageRef::Knockout(stage_id);
    let round = event
        .knockout_stage(stage_id)
        .ok_or(EventError::StageNotFound(stage_id))?
        .round;
    if event.stage_matches(stage_ref).next().is_some() {
        return Err(EventError::StageAlreadySeeded(stage_id));
    }

    let previous = event
        .knockout_stages
        .iter()
        .filter(|s| s.round < round)
        .max_by_key(|s| s.round)
        .filter(|s| event.stage_matches(StageRef::Knockout(s.id)).next().is_some())
        .map(|s| s.id);

    let (byes, pairs) = match previous {
        Some(previous_id) => (Vec::new(), next_round_pairs(event, previous_id)?),
        None => first_round_pairs(event)?,
    };

    log::debug!(
        "Event {}: round {} seeded with {} matches and {} byes",
        event.id,
        round,
        pairs.len(),
        byes.len()
    );

    let event_id = event.id;
    event.matches.extend(
        pairs
            .into_iter()
            .map(|(a, b)| GameMatch::new(event_id, stage_ref, a, b)),
    );
    if let Some(stage) = event.knockout_stages.iter_mut().find(|s| s.id == stage_id) {
        stage.byes = byes;
        stage.completed = false;
    }
    Ok(())
}

/// Byes and pairs for the opening round.
fn first_round_pairs(
    event: &Event,
) -> Result<(Vec<PlayerId>, Vec<(PlayerId, PlayerId)>), EventError> {
    if !event.group_stage_completed() {
        return Err(EventError::GroupStageUnfinished);
    }
    let mut ranked = event.entrants.clone();
    sort_by_ranking(&mut ranked);

    let advancement = Advancement::for_field(ranked.len());
    if advancement.players_advancing < 2 {
        return Err(EventError::NotEnoughPlayers {
            required: 2,
            found: ranked.len(),
        });
    }

    let seeds: Vec<PlayerId> = ranked
        .iter()
        .take(advancement.players_advancing)
        .map(|r| r.player_id)
        .collect();
    let (byes, contenders) = seeds.split_at(advancement.bye_count);
    Ok((byes.to_vec(), pair_top_bottom(contenders)))
}

/// Pairs for a round following `previous_id`.
fn next_round_pairs(
    event: &Event,
    previous_id: StageId,
) -> Result<Vec<(PlayerId, PlayerId)>, EventError> {
    let previous = event
        .knockout_stage(previous_id)
        .ok_or(EventError::StageNotFound(previous_id))?;

    let mut field = previous.byes.clone();
    for m in event.stage_matches(StageRef::Knockout(previous_id)) {
        let winner = m
            .winner()
            .ok_or(EventError::PreviousStageUnfinished(previous_id))?;
        field.push(winner);
    }

    if field.len() < 2 {
        return Err(EventError::BracketDecided);
    }
    if field.len() % 2 != 0 {
        return Err(EventError::InvariantViolation(format!(
            "odd knockout field of {} after round {}",
            field.len(),
            previous.round
        )));
    }
    Ok(pair_top_bottom(&field))
}

/// Winner of the bracket, once the last round is a single finished match with no byes.
pub fn champion(event: &Event) -> Option<PlayerId> {
    let last = event
        .knockout_stages
        .iter()
        .filter(|s| event.stage_matches(StageRef::Knockout(s.id)).next().is_some())
        .max_by_key(|s| s.round)?;
    if !last.byes.is_empty() {
        return None;
    }
    let mut matches = event.stage_matches(StageRef::Knockout(last.id));
    match (matches.next(), matches.next()) {
        (Some(final_match), None) => final_match.winner(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_plays_bottom() {
        let seeds: Vec<u32> = (1..=8).collect();
        assert_eq!(
            pair_top_bottom(&seeds),
            vec![(1, 8), (2, 7), (3, 6), (4, 5)]
        );
    }

    #[test]
    fn nothing_to_pair() {
        assert!(pair_top_bottom::<u32>(&[]).is_empty());
        assert!(pair_top_bottom(&[1]).is_empty());
    }

    #[test]
    fn create_requires_previous_round_seeded() {
        let mut event = Event::new("Cup");
        let first = create_knockout_stage(&mut event).unwrap();
        assert_eq!(
            create_knockout_stage(&mut event),
            Err(EventError::StageNotSeeded(first))
        );
    }

    #[test]
    fn seeding_needs_two_players() {
        let mut event = Event::new("Cup");
        let stage = create_knockout_stage(&mut event).unwrap();
        assert_eq!(
            seed_knockout_stage(&mut event, stage),
            Err(EventError::NotEnoughPlayers { required: 2, found: 0 })
        );
    }
}
