//! Stage: one tournament phase (league round or cup).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stage.
pub type StageId = Uuid;

/// League stages run a group phase; knockout stages only receive finals matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    #[default]
    League,
    Knockout,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Created, teams still being imported.
    #[default]
    Planned,
    InProgress,
    Finished,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    /// Sport modality, e.g. "futsal" or "football 7".
    pub modality: String,
    pub title: String,
    pub kind: StageKind,
    pub status: StageStatus,
    pub start_date: NaiveDate,
    pub venue: String,
}

impl Stage {
    /// Create a new stage in `Planned` status.
    pub fn new(
        modality: impl Into<String>,
        title: impl Into<String>,
        kind: StageKind,
        start_date: NaiveDate,
        venue: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality: modality.into(),
            title: title.into(),
            kind,
            status: StageStatus::Planned,
            start_date,
            venue: venue.into(),
        }
    }
}
