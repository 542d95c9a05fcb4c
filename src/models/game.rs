//! Match (game), MatchStatus and MatchKind.

use crate::models::error::EngineError;
use crate::models::stage::StageId;
use crate::models::team::TeamId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a match. Transitions are plain field writes, not guarded.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finalized,
    Cancelled,
}

impl std::str::FromStr for MatchStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(MatchStatus::Scheduled),
            "LIVE" => Ok(MatchStatus::Live),
            "FINALIZED" => Ok(MatchStatus::Finalized),
            "CANCELLED" => Ok(MatchStatus::Cancelled),
            other => Err(EngineError::validation(format!("unknown match status '{}'", other))),
        }
    }
}

/// Where the match came from: the group fixture generator or the finals delegate.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    #[default]
    Group,
    Finals,
}

/// A single match between two teams of a stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub stage_id: StageId,
    pub round: u32,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// None while the opponent is still TBD (finals brackets).
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub penalty_a: Option<u32>,
    pub penalty_b: Option<u32>,
    pub status: MatchStatus,
    pub kind: MatchKind,
    pub referee: Option<String>,
    /// Mirrors `status == Finalized`.
    pub finalized: bool,
    /// Creation order, assigned by the store on insert.
    pub seq: u64,
}

impl GameMatch {
    pub fn new(
        stage_id: StageId,
        round: u32,
        team_a: Option<TeamId>,
        team_b: Option<TeamId>,
        kind: MatchKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage_id,
            round,
            date: None,
            time: None,
            team_a,
            team_b,
            score_a: None,
            score_b: None,
            penalty_a: None,
            penalty_b: None,
            status: MatchStatus::Scheduled,
            kind,
            referee: None,
            finalized: false,
            seq: 0,
        }
    }

    /// Group-phase fixture between two known teams.
    pub fn group(stage_id: StageId, round: u32, team_a: TeamId, team_b: TeamId) -> Self {
        Self::new(stage_id, round, Some(team_a), Some(team_b), MatchKind::Group)
    }

    /// True if `team` plays in this match.
    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a == Some(team) || self.team_b == Some(team)
    }

    /// Overwrite scores unconditionally; status is not consulted.
    pub fn set_score(
        &mut self,
        score_a: u32,
        score_b: u32,
        penalty_a: Option<u32>,
        penalty_b: Option<u32>,
    ) {
        self.score_a = Some(score_a);
        self.score_b = Some(score_b);
        self.penalty_a = penalty_a;
        self.penalty_b = penalty_b;
    }

    /// Set status and keep `finalized` in sync. Finalizing needs both scores.
    pub fn set_status(&mut self, status: MatchStatus) -> Result<(), EngineError> {
        if status == MatchStatus::Finalized && (self.score_a.is_none() || self.score_b.is_none()) {
            return Err(EngineError::validation(
                "cannot finalize a match without both scores set",
            ));
        }
        self.status = status;
        self.finalized = status == MatchStatus::Finalized;
        Ok(())
    }
}
