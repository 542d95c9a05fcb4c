//! MatchEvent: append-only facts recorded during a match.

use crate::models::error::EngineError;
use crate::models::game::MatchId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match event.
pub type EventId = Uuid;

/// Athletes live in the external roster; the engine only keeps the reference.
pub type AthleteId = Uuid;

/// Latest minute accepted for an event (extra time included).
pub const MAX_MINUTE: u8 = 120;

/// Closed taxonomy of recordable events.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Goal,
    OwnGoal,
    PenaltyGoal,
    YellowCard,
    RedCard,
    Substitution,
}

impl EventType {
    /// Parse an operator-supplied label. Case, surrounding spaces, dashes and
    /// inner spaces are normalized ("yellow card" == "YELLOW_CARD").
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        match normalized.as_str() {
            "GOAL" => Ok(EventType::Goal),
            "OWN_GOAL" => Ok(EventType::OwnGoal),
            "PENALTY_GOAL" => Ok(EventType::PenaltyGoal),
            "YELLOW_CARD" => Ok(EventType::YellowCard),
            "RED_CARD" => Ok(EventType::RedCard),
            "SUBSTITUTION" => Ok(EventType::Substitution),
            "" => Err(EngineError::validation("event type is required")),
            _ => Err(EngineError::validation(format!("unknown event type '{}'", raw.trim()))),
        }
    }

    pub fn is_scoring(self) -> bool {
        matches!(self, EventType::Goal | EventType::OwnGoal | EventType::PenaltyGoal)
    }

    pub fn is_disciplinary(self) -> bool {
        matches!(self, EventType::YellowCard | EventType::RedCard)
    }
}

/// Optional details attached to an event.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub athlete_id: Option<AthleteId>,
    pub minute: Option<u8>,
    /// Free label, e.g. "1T", "2T", "ET".
    pub period: Option<String>,
    /// Shirt number at the time of the event, kept even if the roster changes later.
    pub shirt_number: Option<u32>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub event_type: EventType,
    #[serde(flatten)]
    pub details: EventDetails,
    pub created_at: DateTime<Utc>,
    /// Creation order, assigned by the store; strictly increasing across inserts.
    pub seq: u64,
}

impl MatchEvent {
    pub fn new(match_id: MatchId, team_id: TeamId, event_type: EventType, details: EventDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            team_id,
            event_type,
            details,
            created_at: Utc::now(),
            seq: 0,
        }
    }
}

/// Raw event submission as received at the boundary. Every field may be
/// missing; `validate` turns it into a recordable event or a validation error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordEventRequest {
    pub match_id: Option<MatchId>,
    pub team_id: Option<TeamId>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub athlete_id: Option<AthleteId>,
    pub minute: Option<u8>,
    pub period: Option<String>,
    pub shirt_number: Option<u32>,
    pub note: Option<String>,
}

impl RecordEventRequest {
    pub fn new(match_id: MatchId, team_id: TeamId, event_type: impl Into<String>) -> Self {
        Self {
            match_id: Some(match_id),
            team_id: Some(team_id),
            event_type: Some(event_type.into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<MatchEvent, EngineError> {
        let match_id = self
            .match_id
            .ok_or_else(|| EngineError::validation("match_id is required"))?;
        let team_id = self
            .team_id
            .ok_or_else(|| EngineError::validation("team_id is required"))?;
        let event_type = EventType::parse(self.event_type.as_deref().unwrap_or(""))?;
        if let Some(minute) = self.minute {
            if minute > MAX_MINUTE {
                return Err(EngineError::validation(format!(
                    "minute must be between 0 and {} (got {})",
                    MAX_MINUTE, minute
                )));
            }
        }
        let details = EventDetails {
            athlete_id: self.athlete_id,
            minute: self.minute,
            period: non_blank(self.period),
            shirt_number: self.shirt_number,
            note: non_blank(self.note),
        };
        Ok(MatchEvent::new(match_id, team_id, event_type, details))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
