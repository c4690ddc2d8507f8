use chrono::{DateTime, Utc};
use hireflow::workflows::candidates::ownership::{
    Candidate, CandidateRegistry, ContactId, NotificationError, NotificationPublisher,
    OwnershipNotice, RegistryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Single-node candidate store. The mutex gives the insert its uniqueness
/// guarantee and the update its compare-and-set semantics; a database
/// deployment would lean on a unique index and a conditional write.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateRegistry {
    records: Arc<Mutex<HashMap<ContactId, Candidate>>>,
}

impl CandidateRegistry for InMemoryCandidateRegistry {
    fn insert(&self, candidate: Candidate) -> Result<Candidate, RegistryError> {
        let mut guard = self.records.lock().expect("registry mutex poisoned");
        if guard.contains_key(&candidate.contact) {
            return Err(RegistryError::Duplicate);
        }
        guard.insert(candidate.contact.clone(), candidate.clone());
        Ok(candidate)
    }

    fn fetch(&self, contact: &ContactId) -> Result<Option<Candidate>, RegistryError> {
        let guard = self.records.lock().expect("registry mutex poisoned");
        Ok(guard.get(contact).cloned())
    }

    fn update(&self, mut candidate: Candidate) -> Result<Candidate, RegistryError> {
        let mut guard = self.records.lock().expect("registry mutex poisoned");
        let stored = guard
            .get_mut(&candidate.contact)
            .ok_or(RegistryError::NotFound)?;
        if stored.revision != candidate.revision {
            return Err(RegistryError::StaleWrite);
        }
        candidate.revision += 1;
        *stored = candidate.clone();
        Ok(candidate)
    }

    fn clear_expired_locks(&self, now: DateTime<Utc>) -> Result<usize, RegistryError> {
        let mut guard = self.records.lock().expect("registry mutex poisoned");
        let mut cleared = 0;
        for candidate in guard.values_mut() {
            let expired =
                candidate.is_locked && candidate.lock_expiry.is_some_and(|expiry| expiry < now);
            if expired {
                candidate.is_locked = false;
                candidate.lock_expiry = None;
                candidate.revision += 1;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

/// Logs hand-off notices instead of delivering them; the mail and in-app
/// feed adapters plug in behind the same trait.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationPublisher {
    notices: Arc<Mutex<Vec<OwnershipNotice>>>,
}

impl NotificationPublisher for LoggingNotificationPublisher {
    fn notify(&self, notice: OwnershipNotice) -> Result<(), NotificationError> {
        info!(
            recipient = %notice.recipient,
            contact = %notice.contact_id,
            acting = %notice.acting_employee,
            "candidate hand-off notice"
        );
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

impl LoggingNotificationPublisher {
    pub(crate) fn notices(&self) -> Vec<OwnershipNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}
