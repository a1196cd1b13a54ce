//! Data structures for tournament progression: players, ranks, stages, matches, events.

mod event;
mod game;
mod player;
mod rank;
mod stage;

pub use event::{ErrorKind, Event, EventError, EventId};
pub use game::{GameMatch, MatchId, StageRef};
pub use player::{Player, PlayerId, ELITE_RATING, STARTING_RATING};
pub use rank::{PlayerRank, WIN_POINT_MULTIPLIER};
pub use stage::{GroupStage, KnockoutStage, StageId};
