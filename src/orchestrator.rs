//! Stage orchestration: runs progression steps against stored events.
//!
//! Every mutating operation claims the event, works on an owned snapshot and
//! commits it with a single store call. A failed step saves nothing.

use crate::logic;
use crate::models::{
    Event, EventError, EventId, GameMatch, GroupStage, KnockoutStage, MatchId, Player, PlayerId,
    PlayerRank, StageId, StageRef,
};
use crate::store::EventStore;
use std::collections::HashSet;
use std::sync::Mutex;

/// Events with an operation in flight.
#[derive(Default)]
pub struct EventLocks {
    active: Mutex<HashSet<EventId>>,
}

/// Exclusive claim on one event, released on drop.
pub struct EventClaim<'a> {
    locks: &'a EventLocks,
    event_id: EventId,
}

impl EventLocks {
    /// Claim `event_id`, or fail with `Conflict` if another operation holds it.
    pub fn try_claim(&self, event_id: EventId) -> Result<EventClaim<'_>, EventError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| EventError::InvariantViolation("event lock poisoned".to_string()))?;
        if !active.insert(event_id) {
            log::warn!("Event {}: rejected concurrent operation", event_id);
            return Err(EventError::Conflict(event_id));
        }
        Ok(EventClaim {
            locks: self,
            event_id,
        })
    }
}

impl Drop for EventClaim<'_> {
    fn drop(&mut self) {
        // A poisoned set still has to release the claim.
        let mut active = match self.locks.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(&self.event_id);
    }
}

/// Drives an event through groups, knockout rounds and rating application.
pub struct StageOrchestrator<S> {
    store: S,
    locks: EventLocks,
}

impl<S: EventStore> StageOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: EventLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hold an event exclusively; other mutations of it fail with `Conflict` meanwhile.
    pub fn claim(&self, event_id: EventId) -> Result<EventClaim<'_>, EventError> {
        self.locks.try_claim(event_id)
    }

    /// Claim, snapshot, mutate, commit.
    fn with_event<T, F>(&self, event_id: EventId, f: F) -> Result<T, EventError>
    where
        F: FnOnce(&mut Event) -> Result<T, EventError>,
    {
        let _claim = self.claim(event_id)?;
        let mut event = self.store.event(event_id)?;
        let out = f(&mut event)?;
        self.store.save_event(event)?;
        Ok(out)
    }

    pub fn create_player(&self, name: &str, rating: Option<i32>) -> Result<Player, EventError> {
        let player = match rating {
            Some(rating) => Player::with_rating(name, rating),
            None => Player::new(name),
        };
        self.store.insert_player(player.clone())?;
        Ok(player)
    }

    pub fn create_event(&self, name: &str) -> Result<Event, EventError> {
        let event = Event::new(name);
        self.store.insert_event(event.clone())?;
        log::info!("Created event {} ({})", event.id, event.name);
        Ok(event)
    }

    /// Register a player for an event, seeding the working rating from the durable one.
    pub fn register_entrant(&self, event_id: EventId, player_id: PlayerId) -> Result<PlayerRank, EventError> {
        let player = self.store.player(player_id)?;
        self.with_event(event_id, |event| event.register(&player).cloned())
    }

    /// Generate all groups and their round-robin matches. Only once per event.
    pub fn create_group_stage(&self, event_id: EventId) -> Result<Vec<GroupStage>, EventError> {
        self.with_event(event_id, |event| {
            logic::generate_group_stage(event)?;
            Ok(event.group_stages.clone())
        })
    }

    /// Append an empty knockout round.
    pub fn create_knockout_stage(&self, event_id: EventId) -> Result<KnockoutStage, EventError> {
        self.with_event(event_id, |event| {
            let id = logic::create_knockout_stage(event)?;
            knockout_stage(event, id)
        })
    }

    /// Generate the matches of a knockout round from the entrants or the previous round.
    pub fn generate_knockout_matches(
        &self,
        event_id: EventId,
        stage_id: StageId,
    ) -> Result<Vec<GameMatch>, EventError> {
        self.with_event(event_id, |event| {
            logic::seed_knockout_stage(event, stage_id)?;
            log::info!("Event {}: generated knockout matches for stage {}", event_id, stage_id);
            Ok(event.stage_matches(StageRef::Knockout(stage_id)).cloned().collect())
        })
    }

    /// Take the next step: the group stage if nothing exists yet, otherwise the next knockout round.
    /// Returns the matches created.
    pub fn advance(&self, event_id: EventId) -> Result<Vec<GameMatch>, EventError> {
        self.with_event(event_id, |event| {
            let before = event.matches.len();
            if event.group_stages.is_empty() && event.knockout_stages.is_empty() {
                logic::generate_group_stage(event)?;
            } else {
                // An empty latest round is seeded in place rather than stacked on.
                let unseeded = event
                    .latest_knockout_stage()
                    .map(|s| s.id)
                    .filter(|&id| event.stage_matches(StageRef::Knockout(id)).next().is_none());
                let stage_id = match unseeded {
                    Some(id) => id,
                    None => logic::create_knockout_stage(event)?,
                };
                logic::seed_knockout_stage(event, stage_id)?;
            }
            Ok(event.matches[before..].to_vec())
        })
    }

    /// Change the scores of an open match.
    pub fn update_scores(
        &self,
        event_id: EventId,
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    ) -> Result<GameMatch, EventError> {
        self.with_event(event_id, |event| {
            logic::update_match_scores(event, match_id, score_1, score_2)?;
            get_match(event, match_id)
        })
    }

    /// Finish a match and update both entrants' standing and working rating.
    pub fn record_result(
        &self,
        event_id: EventId,
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    ) -> Result<GameMatch, EventError> {
        self.with_event(event_id, |event| {
            logic::record_match_result(event, match_id, score_1, score_2, |id| self.store.player(id))?;
            get_match(event, match_id)
        })
    }

    /// Copy working ratings into the durable player records and close the event.
    ///
    /// Players are read and written inside one store update, so events sharing
    /// an entrant cannot overwrite each other's rating changes.
    pub fn apply_ratings(&self, event_id: EventId) -> Result<Vec<Player>, EventError> {
        let _claim = self.claim(event_id)?;
        let players = self
            .store
            .update_event_and_players(event_id, &mut |event, players| {
                logic::apply_event_ratings(event, players)
            })?;
        log::info!("Event {}: applied ratings for {} players", event_id, players.len());
        Ok(players)
    }

    /// Delete the latest knockout round and its matches.
    pub fn delete_knockout_stage(&self, event_id: EventId, stage_id: StageId) -> Result<(), EventError> {
        self.with_event(event_id, |event| {
            event.ensure_open()?;
            let removed = event.remove_knockout_stage(stage_id)?;
            log::info!("Event {}: deleted knockout round {}", event_id, removed.round);
            Ok(())
        })
    }

    /// Delete an event with all its stages, matches and entrant ranks.
    pub fn delete_event(&self, event_id: EventId) -> Result<(), EventError> {
        let _claim = self.claim(event_id)?;
        let removed = self.store.remove_event(event_id)?;
        log::info!("Deleted event {} ({})", removed.id, removed.name);
        Ok(())
    }

    pub fn event(&self, event_id: EventId) -> Result<Event, EventError> {
        self.store.event(event_id)
    }

    /// Entrants strongest first.
    pub fn standings(&self, event_id: EventId) -> Result<Vec<PlayerRank>, EventError> {
        self.store.ranked_entrants(event_id)
    }

    /// Winner of the knockout bracket, once decided.
    pub fn champion(&self, event_id: EventId) -> Result<Option<PlayerId>, EventError> {
        Ok(logic::champion(&self.store.event(event_id)?))
    }

    /// All players by durable rating.
    pub fn leaderboard(&self) -> Result<Vec<Player>, EventError> {
        let mut players = self.store.players()?;
        logic::sort_by_rating(&mut players);
        Ok(players)
    }
}

fn knockout_stage(event: &Event, id: StageId) -> Result<KnockoutStage, EventError> {
    event
        .knockout_stage(id)
        .cloned()
        .ok_or(EventError::StageNotFound(id))
}

fn get_match(event: &Event, id: MatchId) -> Result<GameMatch, EventError> {
    event
        .get_match(id)
        .cloned()
        .ok_or(EventError::MatchNotFound(id))
}
