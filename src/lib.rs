//! Tournament progression engine: group stages, knockout brackets and live ratings.

pub mod logic;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use logic::{
    apply_event_ratings, champion, create_knockout_stage, distribute_into_groups,
    generate_group_stage, optimal_group_size, record_match_result, round_robin_pairs,
    seed_knockout_stage, Advancement,
};
pub use models::{
    ErrorKind, Event, EventError, EventId, GameMatch, GroupStage, KnockoutStage, MatchId, Player,
    PlayerId, PlayerRank, StageId, StageRef,
};
pub use orchestrator::{EventClaim, EventLocks, StageOrchestrator};
pub use store::{EventStore, MemoryStore};
