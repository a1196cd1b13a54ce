//! GroupStage and KnockoutStage records.

use crate::models::event::EventId;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stage (group or knockout).
pub type StageId = Uuid;

/// One round-robin group. All groups of an event are generated together, once.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStage {
    pub id: StageId,
    pub event_id: EventId,
    /// 0-based, contiguous across the event's groups.
    pub group_index: usize,
    /// Players in the order they were dealt into the group.
    pub players: Vec<PlayerId>,
    /// True once every match of the group is finished.
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl GroupStage {
    pub fn new(event_id: EventId, group_index: usize, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            group_index,
            players,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// One single-elimination round. Round N consumes round N-1's byes and winners.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutStage {
    pub id: StageId,
    pub event_id: EventId,
    /// 1-based round number.
    pub round: u32,
    /// Seeds who skip this round and go straight to the next one.
    pub byes: Vec<PlayerId>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl KnockoutStage {
    pub fn new(event_id: EventId, round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            round,
            byes: Vec::new(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}
