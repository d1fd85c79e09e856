//! Overwrite-only mailbox holding the latest diagnosis summary.
//!
//! Downstream features (fertilizer recommendation, for one) poll
//! [`LastDiagnosisPublisher::read_latest`] to default their inputs. There is
//! no subscription; readers must treat the value as advisory and possibly stale.

use crate::record::{self, NAMESPACE};
use crate::types::LastDiagnosis;
use agrolens_store::SharedStorage;

#[derive(Clone)]
pub struct LastDiagnosisPublisher {
    storage: SharedStorage,
}

impl LastDiagnosisPublisher {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    fn storage_key() -> String {
        format!("{NAMESPACE}:last-diagnosis")
    }

    /// Replace the mailbox contents. Storage failures are logged and dropped.
    pub fn publish(&self, summary: &LastDiagnosis) {
        record::write_lossy(self.storage.as_ref(), &Self::storage_key(), summary);
    }

    pub fn read_latest(&self) -> Option<LastDiagnosis> {
        record::read(self.storage.as_ref(), &Self::storage_key())
    }
}
