//! Team (roster reference data) and its link into a stage.

use crate::models::stage::StageId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Which of the two draw pools a team belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Group {
    #[default]
    A,
    B,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::A => write!(f, "A"),
            Group::B => write!(f, "B"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub city: String,
}

impl Team {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            city: city.into(),
        }
    }
}

/// A team registered in a stage. Unique per (stage, team).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StageTeamLink {
    pub stage_id: StageId,
    pub team_id: TeamId,
    pub group: Group,
    /// 1-based position inside the group; None until a draw has run.
    pub draw_order: Option<u32>,
}

impl StageTeamLink {
    /// Fresh link as created on import: group A, not drawn yet.
    pub fn new(stage_id: StageId, team_id: TeamId) -> Self {
        Self {
            stage_id,
            team_id,
            group: Group::A,
            draw_order: None,
        }
    }
}

/// One (team, group, order) triple committed by a draw.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DrawAssignment {
    pub team_id: TeamId,
    pub group: Group,
    pub order: u32,
}
