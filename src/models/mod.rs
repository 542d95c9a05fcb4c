//! Data structures for the tournament engine: stages, teams, matches, events.

mod error;
mod event;
mod game;
mod stage;
mod team;

pub use error::EngineError;
pub use event::{
    AthleteId, EventDetails, EventId, EventType, MatchEvent, RecordEventRequest, MAX_MINUTE,
};
pub use game::{GameMatch, MatchId, MatchKind, MatchStatus};
pub use stage::{Stage, StageId, StageKind, StageStatus};
pub use team::{DrawAssignment, Group, StageTeamLink, Team, TeamId};
