//! Engine: store + notifier + finals delegate. The operations themselves are
//! implemented per component in `logic/`.

use crate::models::StageId;
use crate::notify::Notifier;
use crate::store::Repository;
use chrono::NaiveDate;

/// External knockout-bracket generator. The engine only forwards stage id and
/// cutoff date; an `Err` payload is surfaced to the caller verbatim.
pub trait FinalsGenerator: Send + Sync {
    fn generate(&self, stage_id: StageId, cutoff: NaiveDate) -> Result<usize, String>;
}

pub struct Engine<R: Repository> {
    pub(crate) store: R,
    pub(crate) notifier: Notifier,
    pub(crate) finals: Box<dyn FinalsGenerator>,
}

impl<R: Repository> Engine<R> {
    pub fn new(store: R, notifier: Notifier, finals: Box<dyn FinalsGenerator>) -> Self {
        Self {
            store,
            notifier,
            finals,
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
