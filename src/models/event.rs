//! Event (owner of entrants, stages and matches) and EventError.

use crate::models::game::{GameMatch, MatchId, StageRef};
use crate::models::player::{Player, PlayerId};
use crate::models::rank::PlayerRank;
use crate::models::stage::{GroupStage, KnockoutStage, StageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Broad class of an [`EventError`], for callers that map errors to responses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Conflict,
    InvariantViolation,
}

/// Errors that can occur during progression operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),
    #[error("Stage not found: {0}")]
    StageNotFound(StageId),
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),
    #[error("Player {0} is not registered for this event")]
    EntrantNotFound(PlayerId),

    #[error("Player {0} is already registered for this event")]
    AlreadyRegistered(PlayerId),
    #[error("Registration is closed once stages exist")]
    RegistrationClosed,
    #[error("Need at least {required} players (have {found})")]
    NotEnoughPlayers { required: usize, found: usize },
    #[error("Group stage has already been generated for this event")]
    GroupStageExists,
    #[error("Knockout stage already started; groups can no longer be generated")]
    KnockoutStarted,
    #[error("Not all group matches are finished")]
    GroupStageUnfinished,
    #[error("Not all matches of the previous stage {0} are finished")]
    PreviousStageUnfinished(StageId),
    #[error("Stage {0} has no matches yet")]
    StageNotSeeded(StageId),
    #[error("Stage {0} already has matches")]
    StageAlreadySeeded(StageId),
    #[error("Knockout bracket already has a winner")]
    BracketDecided,
    #[error("Only the latest knockout stage can be deleted")]
    NotLatestStage(StageId),
    #[error("Stage {0} already has finished matches")]
    StageHasResults(StageId),
    #[error("Match {0} is already finished")]
    MatchFinished(MatchId),
    #[error("Match {0} needs both scores before it can finish")]
    MatchUnscored(MatchId),
    #[error("Match {0} cannot end in a draw")]
    DrawNotAllowed(MatchId),
    #[error("Not all matches of the event are finished")]
    PendingMatches,
    #[error("No matches have been played in this event")]
    NoMatchesPlayed,
    #[error("Ratings have already been applied for this event")]
    RatingsAlreadyApplied,
    #[error("Event is closed")]
    EventClosed,

    #[error("Another operation is in progress for event {0}")]
    Conflict(EventId),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl EventError {
    pub fn kind(&self) -> ErrorKind {
        use EventError::*;
        match self {
            EventNotFound(_) | PlayerNotFound(_) | StageNotFound(_) | MatchNotFound(_)
            | EntrantNotFound(_) => ErrorKind::NotFound,
            Conflict(_) => ErrorKind::Conflict,
            InvariantViolation(_) => ErrorKind::InvariantViolation,
            _ => ErrorKind::InvalidState,
        }
    }
}

/// An event owns its entrants, stages and matches. Matches refer to players and stages by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// One rank per registered player.
    pub entrants: Vec<PlayerRank>,
    pub group_stages: Vec<GroupStage>,
    /// Ordered by round.
    pub knockout_stages: Vec<KnockoutStage>,
    /// All matches of the event, in creation order.
    pub matches: Vec<GameMatch>,
    pub ratings_applied: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with no entrants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            entrants: Vec::new(),
            group_stages: Vec::new(),
            knockout_stages: Vec::new(),
            matches: Vec::new(),
            ratings_applied: false,
            created_at: Utc::now(),
        }
    }

    pub fn entrant(&self, player_id: PlayerId) -> Option<&PlayerRank> {
        self.entrants.iter().find(|r| r.player_id == player_id)
    }

    pub fn entrant_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerRank> {
        self.entrants.iter_mut().find(|r| r.player_id == player_id)
    }

    /// Register a player. Only valid before any stage exists.
    pub fn register(&mut self, player: &Player) -> Result<&PlayerRank, EventError> {
        self.ensure_open()?;
        if !self.group_stages.is_empty() || !self.knockout_stages.is_empty() {
            return Err(EventError::RegistrationClosed);
        }
        if self.entrant(player.id).is_some() {
            return Err(EventError::AlreadyRegistered(player.id));
        }
        self.entrants.push(PlayerRank::new(player, self.id));
        Ok(&self.entrants[self.entrants.len() - 1])
    }

    /// Fails once ratings have been applied.
    pub fn ensure_open(&self) -> Result<(), EventError> {
        if self.ratings_applied {
            return Err(EventError::EventClosed);
        }
        Ok(())
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Matches of one stage, in creation order.
    pub fn stage_matches(&self, stage: StageRef) -> impl Iterator<Item = &GameMatch> + '_ {
        self.matches.iter().filter(move |m| m.stage == stage)
    }

    pub fn knockout_stage(&self, id: StageId) -> Option<&KnockoutStage> {
        self.knockout_stages.iter().find(|s| s.id == id)
    }

    pub fn latest_knockout_stage(&self) -> Option<&KnockoutStage> {
        self.knockout_stages.iter().max_by_key(|s| s.round)
    }

    pub fn has_pending_matches(&self) -> bool {
        self.matches.iter().any(|m| !m.finished)
    }

    /// True when there are no groups or every group is completed.
    pub fn group_stage_completed(&self) -> bool {
        self.group_stages.iter().all(|g| g.completed)
    }

    /// Recompute a stage's `completed` flag from its matches.
    pub fn refresh_stage_completion(&mut self, stage: StageRef) {
        let completed = {
            let mut matches = self.stage_matches(stage).peekable();
            matches.peek().is_some() && matches.all(|m| m.finished)
        };
        match stage {
            StageRef::Group(id) => {
                if let Some(g) = self.group_stages.iter_mut().find(|g| g.id == id) {
                    g.completed = completed;
                }
            }
            StageRef::Knockout(id) => {
                if let Some(k) = self.knockout_stages.iter_mut().find(|k| k.id == id) {
                    k.completed = completed;
                }
            }
        }
    }

    /// Remove a knockout stage together with the matches it owns.
    /// Only the latest round can go, and only while none of its matches are finished.
    pub fn remove_knockout_stage(&mut self, id: StageId) -> Result<KnockoutStage, EventError> {
        let latest = self
            .latest_knockout_stage()
            .ok_or(EventError::StageNotFound(id))?;
        if latest.id != id {
            return if self.knockout_stage(id).is_some() {
                Err(EventError::NotLatestStage(id))
            } else {
                Err(EventError::StageNotFound(id))
            };
        }
        let stage = StageRef::Knockout(id);
        if self.stage_matches(stage).any(|m| m.finished) {
            return Err(EventError::StageHasResults(id));
        }
        self.matches.retain(|m| m.stage != stage);
        let idx = self
            .knockout_stages
            .iter()
            .position(|s| s.id == id)
            .ok_or(EventError::StageNotFound(id))?;
        Ok(self.knockout_stages.remove(idx))
    }
}
