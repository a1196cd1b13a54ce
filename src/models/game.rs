//! Match (game) between two players, bound to exactly one stage.

use crate::models::event::{EventError, EventId};
use crate::models::player::PlayerId;
use crate::models::stage::StageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// The stage a match belongs to: a group stage or a knockout stage, never both.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stage_id", rename_all = "snake_case")]
pub enum StageRef {
    Group(StageId),
    Knockout(StageId),
}

impl StageRef {
    pub fn stage_id(&self) -> StageId {
        match self {
            StageRef::Group(id) | StageRef::Knockout(id) => *id,
        }
    }
}

/// A single match. Scores can change until the match is finished.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub event_id: EventId,
    pub stage: StageRef,
    pub player_1: PlayerId,
    pub player_2: PlayerId,
    /// None if not yet scored.
    pub score_1: Option<u32>,
    pub score_2: Option<u32>,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
}

impl GameMatch {
    pub fn new(event_id: EventId, stage: StageRef, player_1: PlayerId, player_2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            stage,
            player_1,
            player_2,
            score_1: None,
            score_2: None,
            finished: false,
            created_at: Utc::now(),
        }
    }

    /// Set both scores (only while the match is still open).
    pub fn set_scores(&mut self, score_1: u32, score_2: u32) -> Result<(), EventError> {
        if self.finished {
            return Err(EventError::MatchFinished(self.id));
        }
        self.score_1 = Some(score_1);
        self.score_2 = Some(score_2);
        Ok(())
    }

    /// Mark the match finished. Requires both scores and a winner.
    pub fn finish(&mut self) -> Result<(), EventError> {
        if self.finished {
            return Err(EventError::MatchFinished(self.id));
        }
        match (self.score_1, self.score_2) {
            (Some(a), Some(b)) if a == b => Err(EventError::DrawNotAllowed(self.id)),
            (Some(_), Some(_)) => {
                self.finished = true;
                Ok(())
            }
            _ => Err(EventError::MatchUnscored(self.id)),
        }
    }

    /// Winner of a finished match.
    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome().map(|(winner, _)| winner)
    }

    /// Loser of a finished match.
    pub fn loser(&self) -> Option<PlayerId> {
        self.outcome().map(|(_, loser)| loser)
    }

    /// (winner, loser) once finished.
    fn outcome(&self) -> Option<(PlayerId, PlayerId)> {
        if !self.finished {
            return None;
        }
        let (a, b) = (self.score_1?, self.score_2?);
        if a > b {
            Some((self.player_1, self.player_2))
        } else if b > a {
            Some((self.player_2, self.player_1))
        } else {
            None
        }
    }

    /// Points scored by `player_id` and conceded by them, if they played and the match is scored.
    pub fn points_for(&self, player_id: PlayerId) -> Option<(u32, u32)> {
        let (a, b) = (self.score_1?, self.score_2?);
        if player_id == self.player_1 {
            Some((a, b))
        } else if player_id == self.player_2 {
            Some((b, a))
        } else {
            None
        }
    }
}
