//! Domain-event bus: every engine write is announced here so that read
//! projections (live view, standings) refresh before the write returns.

use crate::models::{EventId, MatchId, StageId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Capacity of the live-feed broadcast buffer; slow readers skip ahead.
const FEED_CAPACITY: usize = 256;

/// Something changed in a stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    RosterChanged { stage_id: StageId },
    DrawCommitted { stage_id: StageId },
    ScheduleGenerated { stage_id: StageId, matches_created: usize },
    KickoffsAssigned { stage_id: StageId, matches_updated: usize },
    MatchUpdated { stage_id: StageId, match_id: MatchId },
    MatchEventRecorded { stage_id: StageId, match_id: MatchId, event_id: EventId },
    MatchEventDeleted { stage_id: StageId, match_id: MatchId, event_id: EventId },
    StageCleared { stage_id: StageId },
    FinalsGenerated { stage_id: StageId, matches_created: usize },
}

impl DomainEvent {
    pub fn stage_id(&self) -> StageId {
        match self {
            DomainEvent::RosterChanged { stage_id }
            | DomainEvent::DrawCommitted { stage_id }
            | DomainEvent::ScheduleGenerated { stage_id, .. }
            | DomainEvent::KickoffsAssigned { stage_id, .. }
            | DomainEvent::MatchUpdated { stage_id, .. }
            | DomainEvent::MatchEventRecorded { stage_id, .. }
            | DomainEvent::MatchEventDeleted { stage_id, .. }
            | DomainEvent::StageCleared { stage_id }
            | DomainEvent::FinalsGenerated { stage_id, .. } => *stage_id,
        }
    }
}

/// A read model that must be refreshed after writes.
pub trait Projection: Send + Sync {
    fn invalidate(&self, event: &DomainEvent);
}

/// The two downstream channels every write invalidates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Channel {
    /// Current match list and event feed.
    LiveView,
    /// Classification, top scorers, discipline.
    Standings,
}

pub struct Notifier {
    live_view: Vec<Arc<dyn Projection>>,
    standings: Vec<Arc<dyn Projection>>,
    feed: broadcast::Sender<DomainEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            live_view: Vec::new(),
            standings: Vec::new(),
            feed,
        }
    }

    pub fn subscribe(&mut self, channel: Channel, projection: Arc<dyn Projection>) {
        match channel {
            Channel::LiveView => self.live_view.push(projection),
            Channel::Standings => self.standings.push(projection),
        }
    }

    /// Receiver for long-poll readers of the live feed.
    pub fn feed(&self) -> broadcast::Receiver<DomainEvent> {
        self.feed.subscribe()
    }

    /// Invalidate both channels synchronously, then broadcast to feed readers.
    pub fn publish(&self, event: DomainEvent) {
        log::debug!("publish {:?}", event);
        for p in self.live_view.iter().chain(self.standings.iter()) {
            p.invalidate(&event);
        }
        // No receivers is fine: nobody is long-polling right now.
        let _ = self.feed.send(event);
    }
}

/// Projection that bumps a per-stage revision on every invalidation.
/// Readers compare revisions to know whether their cached view is stale.
#[derive(Debug, Default)]
pub struct RevisionCounter {
    revisions: RwLock<HashMap<StageId, u64>>,
}

impl RevisionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self, stage_id: StageId) -> u64 {
        self.revisions
            .read()
            .map(|g| g.get(&stage_id).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Projection for RevisionCounter {
    fn invalidate(&self, event: &DomainEvent) {
        if let Ok(mut g) = self.revisions.write() {
            *g.entry(event.stage_id()).or_insert(0) += 1;
        }
    }
}
