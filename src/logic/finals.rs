//! Finals trigger: hand the stage over to the external bracket generator.

use crate::engine::Engine;
use crate::models::{EngineError, StageId};
use crate::notify::DomainEvent;
use crate::store::Repository;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FinalsSummary {
    pub matches_created: usize,
}

impl<R: Repository> Engine<R> {
    /// Forward stage id and cutoff date to the finals generator and surface
    /// its answer unchanged.
    pub fn trigger_finals(&self, stage_id: StageId, cutoff: NaiveDate) -> Result<FinalsSummary, EngineError> {
        self.store.stage(stage_id)?;
        let created = self.finals.generate(stage_id, cutoff).map_err(|e| {
            log::warn!("Finals generation for stage {} failed: {}", stage_id, e);
            EngineError::DelegateFailed(e)
        })?;
        log::info!("Finals for stage {}: {} matches created", stage_id, created);
        self.notifier.publish(DomainEvent::FinalsGenerated {
            stage_id,
            matches_created: created,
        });
        Ok(FinalsSummary {
            matches_created: created,
        })
    }
}
