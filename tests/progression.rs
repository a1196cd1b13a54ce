//! End-to-end progression through the orchestrator: groups, knockout rounds, ratings.

use std::sync::Barrier;
use tournament_progression::{
    ErrorKind, Event, EventError, EventId, EventStore, MemoryStore, Player, PlayerId,
    StageOrchestrator, StageRef,
};

fn orchestrator_with_event(n: usize) -> (StageOrchestrator<MemoryStore>, EventId, Vec<Player>) {
    let orch = StageOrchestrator::new(MemoryStore::new());
    let event = orch.create_event("Spring Open").unwrap();
    let players: Vec<Player> = (0..n)
        .map(|i| orch.create_player(&format!("P{i}"), None).unwrap())
        .collect();
    for p in &players {
        orch.register_entrant(event.id, p.id).unwrap();
    }
    (orch, event.id, players)
}

#[test]
fn sixteen_entrants_full_event() {
    let (orch, id, players) = orchestrator_with_event(16);

    // Group stage: 4 groups of 4, 6 matches each.
    let group_matches = orch.advance(id).unwrap();
    assert_eq!(group_matches.len(), 24);
    let event = orch.event(id).unwrap();
    assert_eq!(event.group_stages.len(), 4);
    assert!(event.group_stages.iter().all(|g| g.players.len() == 4));

    assert_eq!(orch.create_group_stage(id), Err(EventError::GroupStageExists));

    // The knockout cannot start while groups are open, and nothing is left behind.
    assert_eq!(orch.advance(id), Err(EventError::GroupStageUnfinished));
    assert!(orch.event(id).unwrap().knockout_stages.is_empty());

    for m in &group_matches {
        orch.record_result(id, m.id, 5, 2).unwrap();
    }
    let event = orch.event(id).unwrap();
    assert!(event.group_stages.iter().all(|g| g.completed));

    // Durable ratings stay put while the event runs.
    for p in &players {
        assert_eq!(orch.store().player(p.id).unwrap().rating, 1700);
    }
    assert!(orch
        .standings(id)
        .unwrap()
        .iter()
        .any(|r| r.temp_rating() != 1700));

    // Knockout: all 16 advance, no byes, 8 first-round matches.
    let mut round = orch.advance(id).unwrap();
    assert_eq!(round.len(), 8);
    assert!(orch.event(id).unwrap().knockout_stages[0].byes.is_empty());

    let mut rounds = 1;
    loop {
        for m in &round {
            orch.record_result(id, m.id, 3, 1).unwrap();
        }
        match orch.advance(id) {
            Ok(next) => {
                round = next;
                rounds += 1;
            }
            Err(e) => {
                assert_eq!(e, EventError::BracketDecided);
                break;
            }
        }
    }
    assert_eq!(rounds, 4);
    assert_eq!(orch.event(id).unwrap().knockout_stages.len(), 4);
    let winner = orch.champion(id).unwrap().expect("bracket decided");
    assert_eq!(orch.standings(id).unwrap()[0].player_id, winner);

    // Closing the event makes working ratings durable.
    let standings = orch.standings(id).unwrap();
    let updated = orch.apply_ratings(id).unwrap();
    assert_eq!(updated.len(), 16);
    for rank in &standings {
        let player = orch.store().player(rank.player_id).unwrap();
        assert_eq!(player.rating, rank.temp_rating());
        assert_eq!(player.matches_played, rank.matches_played());
    }

    assert_eq!(orch.apply_ratings(id), Err(EventError::RatingsAlreadyApplied));
    assert_eq!(orch.advance(id), Err(EventError::EventClosed));
}

#[test]
fn ratings_need_every_match_finished() {
    let (orch, id, _) = orchestrator_with_event(4);
    let matches = orch.advance(id).unwrap();
    orch.record_result(id, matches[0].id, 1, 0).unwrap();
    assert_eq!(orch.apply_ratings(id), Err(EventError::PendingMatches));
}

#[test]
fn ratings_need_at_least_one_match() {
    let (orch, id, players) = orchestrator_with_event(4);
    let err = orch.apply_ratings(id).unwrap_err();
    assert_eq!(err, EventError::NoMatchesPlayed);
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // The event stays open and nobody's record moved.
    assert!(!orch.event(id).unwrap().ratings_applied);
    assert_eq!(orch.advance(id).unwrap().len(), 6);
    for p in &players {
        assert_eq!(orch.store().player(p.id).unwrap().matches_played, 0);
    }
}

#[test]
fn advance_seeds_an_empty_knockout_round() {
    let (orch, id, _) = orchestrator_with_event(4);
    let stage = orch.create_knockout_stage(id).unwrap();

    let matches = orch.advance(id).unwrap();
    assert_eq!(matches.len(), 2);
    let event = orch.event(id).unwrap();
    assert_eq!(event.knockout_stages.len(), 1);
    assert!(matches
        .iter()
        .all(|m| m.stage == StageRef::Knockout(stage.id)));

    for m in &matches {
        orch.record_result(id, m.id, 2, 1).unwrap();
    }
    assert_eq!(orch.advance(id).unwrap().len(), 1);
    assert_eq!(orch.event(id).unwrap().knockout_stages.len(), 2);
}

#[test]
fn scores_can_change_until_the_match_finishes() {
    let (orch, id, _) = orchestrator_with_event(4);
    let m = orch.advance(id).unwrap()[0].clone();

    let open = orch.update_scores(id, m.id, 2, 2).unwrap();
    assert!(!open.finished);
    assert_eq!(orch.record_result(id, m.id, 2, 2), Err(EventError::DrawNotAllowed(m.id)));

    let done = orch.record_result(id, m.id, 4, 2).unwrap();
    assert!(done.finished);
    assert_eq!(done.winner(), Some(m.player_1));
    assert_eq!(orch.update_scores(id, m.id, 0, 4), Err(EventError::MatchFinished(m.id)));
    assert_eq!(orch.record_result(id, m.id, 0, 4), Err(EventError::MatchFinished(m.id)));

    let standings = orch.standings(id).unwrap();
    let winner = standings.iter().find(|r| r.player_id == m.player_1).unwrap();
    let loser = standings.iter().find(|r| r.player_id == m.player_2).unwrap();
    assert_eq!((winner.win_count, winner.score), (1, 5 * 4 - 2));
    assert_eq!((loser.loss_count, loser.score), (1, -4));
    // Equal ratings, K = 40 for new players.
    assert_eq!(winner.temp_rating(), 1720);
    assert_eq!(loser.temp_rating(), 1680);
}

#[test]
fn elite_flag_sticks_after_apply() {
    let orch = StageOrchestrator::new(MemoryStore::new());
    let event = orch.create_event("Masters").unwrap();
    let a = orch.create_player("A", Some(2390)).unwrap();
    let b = orch.create_player("B", Some(2390)).unwrap();
    orch.register_entrant(event.id, a.id).unwrap();
    orch.register_entrant(event.id, b.id).unwrap();

    let stage = orch.create_knockout_stage(event.id).unwrap();
    let matches = orch.generate_knockout_matches(event.id, stage.id).unwrap();
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    orch.record_result(event.id, m.id, 3, 0).unwrap();
    orch.apply_ratings(event.id).unwrap();

    let winner = orch.store().player(m.player_1).unwrap();
    let loser = orch.store().player(m.player_2).unwrap();
    assert_eq!(winner.rating, 2400);
    assert!(winner.reached_elite_rating);
    assert_eq!(loser.rating, 2380);
    assert!(!loser.reached_elite_rating);
    assert_eq!(orch.leaderboard().unwrap()[0].id, winner.id);
}

#[test]
fn registration_rules() {
    let (orch, id, players) = orchestrator_with_event(4);
    assert_eq!(
        orch.register_entrant(id, players[0].id),
        Err(EventError::AlreadyRegistered(players[0].id))
    );

    let ghost = uuid::Uuid::new_v4();
    assert_eq!(orch.register_entrant(id, ghost), Err(EventError::PlayerNotFound(ghost)));

    orch.advance(id).unwrap();
    let late = orch.create_player("Late", None).unwrap();
    assert_eq!(orch.register_entrant(id, late.id), Err(EventError::RegistrationClosed));
}

#[test]
fn concurrent_operation_on_same_event_conflicts() {
    let (orch, id, _) = orchestrator_with_event(8);
    let claim = orch.claim(id).unwrap();

    let err = orch.advance(id).unwrap_err();
    assert_eq!(err, EventError::Conflict(id));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(orch.apply_ratings(id), Err(EventError::Conflict(id)));

    drop(claim);
    assert_eq!(orch.advance(id).unwrap().len(), 12);
}

#[test]
fn unknown_ids_are_not_found() {
    let orch = StageOrchestrator::new(MemoryStore::new());
    let id = uuid::Uuid::new_v4();
    let err = orch.standings(id).unwrap_err();
    assert_eq!(err, EventError::EventNotFound(id));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(orch.advance(id), Err(EventError::EventNotFound(id)));
}

#[test]
fn deleting_stages_and_events() {
    let (orch, id, _) = orchestrator_with_event(4);
    let stage = orch.create_knockout_stage(id).unwrap();
    orch.generate_knockout_matches(id, stage.id).unwrap();
    assert_eq!(orch.event(id).unwrap().matches.len(), 2);

    orch.delete_knockout_stage(id, stage.id).unwrap();
    let event = orch.event(id).unwrap();
    assert!(event.knockout_stages.is_empty());
    assert!(event.matches.is_empty());

    orch.delete_event(id).unwrap();
    assert_eq!(orch.event(id).unwrap_err(), EventError::EventNotFound(id));
}

/// Holds every rating update until two callers are inside the store at once.
struct GatedStore {
    inner: MemoryStore,
    gate: Barrier,
}

impl EventStore for GatedStore {
    fn player(&self, id: PlayerId) -> Result<Player, EventError> {
        self.inner.player(id)
    }

    fn players(&self) -> Result<Vec<Player>, EventError> {
        self.inner.players()
    }

    fn event(&self, id: EventId) -> Result<Event, EventError> {
        self.inner.event(id)
    }

    fn insert_player(&self, player: Player) -> Result<(), EventError> {
        self.inner.insert_player(player)
    }

    fn insert_event(&self, event: Event) -> Result<(), EventError> {
        self.inner.insert_event(event)
    }

    fn save_event(&self, event: Event) -> Result<(), EventError> {
        self.inner.save_event(event)
    }

    fn update_event_and_players(
        &self,
        event_id: EventId,
        apply: &mut dyn FnMut(&mut Event, &mut [Player]) -> Result<(), EventError>,
    ) -> Result<Vec<Player>, EventError> {
        self.gate.wait();
        self.inner.update_event_and_players(event_id, apply)
    }

    fn remove_event(&self, id: EventId) -> Result<Event, EventError> {
        self.inner.remove_event(id)
    }
}

#[test]
fn shared_entrant_keeps_matches_from_both_events() {
    let orch = StageOrchestrator::new(GatedStore {
        inner: MemoryStore::new(),
        gate: Barrier::new(2),
    });
    let shared = orch.create_player("Shared", None).unwrap();
    let mut events = Vec::new();
    for name in ["North", "South"] {
        let event = orch.create_event(name).unwrap();
        orch.register_entrant(event.id, shared.id).unwrap();
        for i in 0..3 {
            let p = orch.create_player(&format!("{name}{i}"), None).unwrap();
            orch.register_entrant(event.id, p.id).unwrap();
        }
        // One group of four: every entrant plays three matches.
        for m in orch.advance(event.id).unwrap() {
            orch.record_result(event.id, m.id, 3, 1).unwrap();
        }
        events.push(event.id);
    }

    let orch = &orch;
    std::thread::scope(|s| {
        let handles: Vec<_> = events
            .iter()
            .map(|&id| s.spawn(move || orch.apply_ratings(id)))
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
    });

    assert_eq!(orch.store().player(shared.id).unwrap().matches_played, 6);
}
