//! Group stage: group sizing, distribution of entrants and round-robin match generation.

use crate::logic::ranking::sort_by_ranking;
use crate::models::{Event, EventError, GameMatch, GroupStage, PlayerId, PlayerRank, StageRef};

/// Smallest group that can be formed.
pub const MIN_GROUP_SIZE: usize = 4;
/// Largest group that will be formed.
pub const MAX_GROUP_SIZE: usize = 7;

/// Pick a group size in `MIN_GROUP_SIZE..=MAX_GROUP_SIZE` for `player_count` players.
///
/// A pool divisible by the maximum size uses it. Otherwise the size leaving the
/// smallest remainder wins, and on equal remainders the larger size (fewer groups).
pub fn optimal_group_size(player_count: usize) -> Result<usize, EventError> {
    if player_count < MIN_GROUP_SIZE {
        return Err(EventError::NotEnoughPlayers {
            required: MIN_GROUP_SIZE,
            found: player_count,
        });
    }
    if player_count % MAX_GROUP_SIZE == 0 {
        return Ok(MAX_GROUP_SIZE);
    }
    (MIN_GROUP_SIZE..=MAX_GROUP_SIZE)
        .map(|size| (player_count % size, size))
        .min_by(|(rem_a, size_a), (rem_b, size_b)| rem_a.cmp(rem_b).then(size_b.cmp(size_a)))
        .map(|(_, size)| size)
        .ok_or_else(|| EventError::InvariantViolation("no candidate group sizes".to_string()))
}

/// Number of groups for `player_count` players. Rounds down, so no group is below the chosen size.
pub fn group_count(player_count: usize) -> Result<usize, EventError> {
    Ok(player_count / optimal_group_size(player_count)?)
}

/// Deal ranked entrants round-robin into groups: entrant `i` goes to group `i % group_count`.
pub fn distribute_into_groups(entrants: &[PlayerRank]) -> Result<Vec<Vec<PlayerId>>, EventError> {
    let mut ranked = entrants.to_vec();
    sort_by_ranking(&mut ranked);

    let count = group_count(ranked.len())?;
    let mut groups: Vec<Vec<PlayerId>> = vec![Vec::new(); count];
    for (i, rank) in ranked.iter().enumerate() {
        groups[i % count].push(rank.player_id);
    }
    Ok(groups)
}

/// Every unordered pair exactly once, ordered by list position (`i < j`).
pub fn round_robin_pairs<T: Copy>(players: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(players.len() * players.len().saturating_sub(1) / 2);
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            pairs.push((players[i], players[j]));
        }
    }
    pairs
}

/// Generate the event's group stage: one `GroupStage` per group, each with all intra-group matches.
///
/// 1. Reject if groups already exist or the knockout phase has started.
/// 2. Rank entrants and deal them into groups.
/// 3. Pair every group round-robin.
pub fn generate_group_stage(event: &mut Event) -> Result<(), EventError> {
    event.ensure_open()?;
    if !event.group_stages.is_empty() {
        return Err(EventError::GroupStageExists);
    }
    if !event.knockout_stages.is_empty() {
        return Err(EventError::KnockoutStarted);
    }

    let groups = distribute_into_groups(&event.entrants)?;

    let mut stages = Vec::with_capacity(groups.len());
    let mut matches = Vec::new();
    for (index, players) in groups.into_iter().enumerate() {
        let stage = GroupStage::new(event.id, index, players);
        let stage_ref = StageRef::Group(stage.id);
        matches.extend(
            round_robin_pairs(&stage.players)
                .into_iter()
                .map(|(a, b)| GameMatch::new(event.id, stage_ref, a, b)),
        );
        stages.push(stage);
    }

    log::info!(
        "Event {}: {} groups, {} group matches",
        event.id,
        stages.len(),
        matches.len()
    );
    event.group_stages = stages;
    event.matches.extend(matches);
    Ok(())
}
