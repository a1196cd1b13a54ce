//! Storage collaborator: snapshot lookups and atomic saves of events and players.

use crate::logic::sort_by_ranking;
use crate::models::{
    Event, EventError, EventId, GameMatch, GroupStage, KnockoutStage, Player, PlayerId,
    PlayerRank, StageRef,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Everything the progression engine needs from persistence.
///
/// Lookups return owned snapshots. Every save is all-or-nothing.
pub trait EventStore: Send + Sync {
    fn player(&self, id: PlayerId) -> Result<Player, EventError>;

    fn players(&self) -> Result<Vec<Player>, EventError>;

    fn event(&self, id: EventId) -> Result<Event, EventError>;

    fn insert_player(&self, player: Player) -> Result<(), EventError>;

    fn insert_event(&self, event: Event) -> Result<(), EventError>;

    /// Replace a stored event (entrants, stages and matches) in one step.
    fn save_event(&self, event: Event) -> Result<(), EventError>;

    /// Read an event and its entrants' player records, let `apply` change them, and
    /// write both back, all under one lock. Nothing is written if `apply` fails or an
    /// entrant's player is unknown. Returns the players as written.
    fn update_event_and_players(
        &self,
        event_id: EventId,
        apply: &mut dyn FnMut(&mut Event, &mut [Player]) -> Result<(), EventError>,
    ) -> Result<Vec<Player>, EventError>;

    /// Remove an event together with everything it owns.
    fn remove_event(&self, id: EventId) -> Result<Event, EventError>;

    /// Entrants of an event, strongest first.
    fn ranked_entrants(&self, event_id: EventId) -> Result<Vec<PlayerRank>, EventError> {
        let mut entrants = self.event(event_id)?.entrants;
        sort_by_ranking(&mut entrants);
        Ok(entrants)
    }

    fn group_stages(&self, event_id: EventId) -> Result<Vec<GroupStage>, EventError> {
        let mut stages = self.event(event_id)?.group_stages;
        stages.sort_by_key(|s| s.group_index);
        Ok(stages)
    }

    /// Knockout stages in round order.
    fn knockout_stages(&self, event_id: EventId) -> Result<Vec<KnockoutStage>, EventError> {
        let mut stages = self.event(event_id)?.knockout_stages;
        stages.sort_by_key(|s| s.round);
        Ok(stages)
    }

    fn stage_matches(&self, event_id: EventId, stage: StageRef) -> Result<Vec<GameMatch>, EventError> {
        let event = self.event(event_id)?;
        let exists = match stage {
            StageRef::Group(id) => event.group_stages.iter().any(|s| s.id == id),
            StageRef::Knockout(id) => event.knockout_stages.iter().any(|s| s.id == id),
        };
        if !exists {
            return Err(EventError::StageNotFound(stage.stage_id()));
        }
        Ok(event.stage_matches(stage).cloned().collect())
    }
}

#[derive(Default)]
struct StoreData {
    players: HashMap<PlayerId, Player>,
    events: HashMap<EventId, Event>,
}

/// In-memory store behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreData>, EventError> {
        self.data
            .read()
            .map_err(|_| EventError::InvariantViolation("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreData>, EventError> {
        self.data
            .write()
            .map_err(|_| EventError::InvariantViolation("store lock poisoned".to_string()))
    }
}

impl EventStore for MemoryStore {
    fn player(&self, id: PlayerId) -> Result<Player, EventError> {
        self.read()?
            .players
            .get(&id)
            .cloned()
            .ok_or(EventError::PlayerNotFound(id))
    }

    fn players(&self) -> Result<Vec<Player>, EventError> {
        Ok(self.read()?.players.values().cloned().collect())
    }

    fn event(&self, id: EventId) -> Result<Event, EventError> {
        self.read()?
            .events
            .get(&id)
            .cloned()
            .ok_or(EventError::EventNotFound(id))
    }

    fn insert_player(&self, player: Player) -> Result<(), EventError> {
        self.write()?.players.insert(player.id, player);
        Ok(())
    }

    fn insert_event(&self, event: Event) -> Result<(), EventError> {
        self.write()?.events.insert(event.id, event);
        Ok(())
    }

    fn save_event(&self, event: Event) -> Result<(), EventError> {
        let mut data = self.write()?;
        let slot = data
            .events
            .get_mut(&event.id)
            .ok_or(EventError::EventNotFound(event.id))?;
        *slot = event;
        Ok(())
    }

    fn update_event_and_players(
        &self,
        event_id: EventId,
        apply: &mut dyn FnMut(&mut Event, &mut [Player]) -> Result<(), EventError>,
    ) -> Result<Vec<Player>, EventError> {
        let mut data = self.write()?;
        let mut event = data
            .events
            .get(&event_id)
            .cloned()
            .ok_or(EventError::EventNotFound(event_id))?;
        let mut players = event
            .entrants
            .iter()
            .map(|r| {
                data.players
                    .get(&r.player_id)
                    .cloned()
                    .ok_or(EventError::PlayerNotFound(r.player_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        apply(&mut event, &mut players)?;

        for player in &players {
            data.players.insert(player.id, player.clone());
        }
        data.events.insert(event_id, event);
        Ok(players)
    }

    fn remove_event(&self, id: EventId) -> Result<Event, EventError> {
        self.write()?
            .events
            .remove(&id)
            .ok_or(EventError::EventNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(store.player(id), Err(EventError::PlayerNotFound(id)));
        assert!(matches!(store.event(id), Err(EventError::EventNotFound(_))));
        assert!(matches!(store.remove_event(id), Err(EventError::EventNotFound(_))));
    }

    #[test]
    fn failed_update_changes_nothing() {
        let store = MemoryStore::new();
        let known = Player::new("known");
        store.insert_player(known.clone()).unwrap();
        let mut event = Event::new("Open");
        event.register(&known).unwrap();
        store.insert_event(event.clone()).unwrap();

        let result = store.update_event_and_players(event.id, &mut |event, players| {
            event.ratings_applied = true;
            players[0].rating = 1800;
            Err(EventError::PendingMatches)
        });
        assert_eq!(result, Err(EventError::PendingMatches));
        assert_eq!(store.player(known.id).unwrap().rating, known.rating);
        assert!(!store.event(event.id).unwrap().ratings_applied);
    }

    #[test]
    fn update_with_unknown_entrant_is_rejected() {
        let store = MemoryStore::new();
        let stranger = Player::new("stranger");
        let mut event = Event::new("Open");
        event.register(&stranger).unwrap();
        store.insert_event(event.clone()).unwrap();

        let mut called = false;
        let result = store.update_event_and_players(event.id, &mut |_, _| {
            called = true;
            Ok(())
        });
        assert_eq!(result, Err(EventError::PlayerNotFound(stranger.id)));
        assert!(!called);
    }

    #[test]
    fn update_writes_event_and_players() {
        let store = MemoryStore::new();
        let player = Player::new("p");
        store.insert_player(player.clone()).unwrap();
        let mut event = Event::new("Open");
        event.register(&player).unwrap();
        store.insert_event(event.clone()).unwrap();

        let written = store
            .update_event_and_players(event.id, &mut |event, players| {
                event.ratings_applied = true;
                players[0].matches_played += 3;
                Ok(())
            })
            .unwrap();
        assert_eq!(written[0].matches_played, 3);
        assert_eq!(store.player(player.id).unwrap().matches_played, 3);
        assert!(store.event(event.id).unwrap().ratings_applied);
    }

    #[test]
    fn stage_matches_of_unknown_stage() {
        let store = MemoryStore::new();
        let event = Event::new("Open");
        store.insert_event(event.clone()).unwrap();
        let stage = uuid::Uuid::new_v4();
        assert_eq!(
            store.stage_matches(event.id, StageRef::Knockout(stage)),
            Err(EventError::StageNotFound(stage))
        );
    }
}
