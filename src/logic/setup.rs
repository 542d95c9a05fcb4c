//! Stage administration: create, status changes, clear.

use crate::engine::Engine;
use crate::models::{EngineError, Stage, StageId, StageKind, StageStatus};
use crate::notify::DomainEvent;
use crate::store::{ClearSummary, Repository};
use chrono::NaiveDate;

/// Pick the stage to show when none was asked for: the latest stage in
/// progress, otherwise the one with the latest start date.
pub fn select_current_stage(stages: &[Stage]) -> Option<&Stage> {
    stages
        .iter()
        .filter(|s| s.status == StageStatus::InProgress)
        .max_by_key(|s| s.start_date)
        .or_else(|| stages.iter().max_by_key(|s| s.start_date))
}

impl<R: Repository> Engine<R> {
    pub fn create_stage(
        &self,
        modality: &str,
        title: &str,
        kind: StageKind,
        start_date: NaiveDate,
        venue: &str,
    ) -> Result<Stage, EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::validation("stage title is required"));
        }
        let stage = self
            .store
            .insert_stage(Stage::new(modality.trim(), title, kind, start_date, venue.trim()))?;
        log::info!("Created stage {} ({})", stage.title, stage.id);
        Ok(stage)
    }

    pub fn set_stage_status(&self, stage_id: StageId, status: StageStatus) -> Result<Stage, EngineError> {
        let stage = self.store.set_stage_status(stage_id, status)?;
        log::info!("Stage {} status {:?}", stage_id, status);
        self.notifier.publish(DomainEvent::RosterChanged { stage_id });
        Ok(stage)
    }

    pub fn current_stage(&self) -> Result<Option<Stage>, EngineError> {
        let stages = self.store.stages()?;
        Ok(select_current_stage(&stages).cloned())
    }

    /// Remove all links, matches, and events of the stage.
    pub fn clear_stage(&self, stage_id: StageId) -> Result<ClearSummary, EngineError> {
        let summary = self.store.clear_stage(stage_id)?;
        log::info!(
            "Cleared stage {}: {} teams, {} matches, {} events",
            stage_id,
            summary.links_removed,
            summary.matches_removed,
            summary.events_removed
        );
        self.notifier.publish(DomainEvent::StageCleared { stage_id });
        Ok(summary)
    }
}
