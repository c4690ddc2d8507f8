use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::candidates::ownership::domain::{Candidate, ContactId, EmployeeId};
use crate::workflows::candidates::ownership::registry::{
    CandidateRegistry, NotificationError, NotificationPublisher, OwnershipNotice, RegistryError,
};
use crate::workflows::candidates::ownership::{ownership_router, CandidateOwnershipService};

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid timestamp")
}

pub(super) fn contact() -> ContactId {
    ContactId("9000000001".to_string())
}

pub(super) fn recruiter(name: &str) -> EmployeeId {
    EmployeeId(name.to_string())
}

pub(super) fn build_service() -> (
    CandidateOwnershipService<MemoryRegistry, MemoryNotifications>,
    Arc<MemoryRegistry>,
    Arc<MemoryNotifications>,
) {
    let registry = Arc::new(MemoryRegistry::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = CandidateOwnershipService::new(registry.clone(), notifications.clone());
    (service, registry, notifications)
}

pub(super) fn router_with_service(
    service: CandidateOwnershipService<MemoryRegistry, MemoryNotifications>,
) -> axum::Router {
    ownership_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRegistry {
    records: Arc<Mutex<HashMap<ContactId, Candidate>>>,
}

impl CandidateRegistry for MemoryRegistry {
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
            let expired = candidate.is_locked
                && candidate.lock_expiry.is_some_and(|expiry| expiry < now);
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

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    notices: Arc<Mutex<Vec<OwnershipNotice>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryNotifications {
    pub(super) fn notices(&self) -> Vec<OwnershipNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }

    pub(super) fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn notify(&self, notice: OwnershipNotice) -> Result<(), NotificationError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(NotificationError::Transport("smtp offline".to_string()));
        }
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct UnavailableRegistry;

impl CandidateRegistry for UnavailableRegistry {
    fn insert(&self, _candidate: Candidate) -> Result<Candidate, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _contact: &ContactId) -> Result<Option<Candidate>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _candidate: Candidate) -> Result<Candidate, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn clear_expired_locks(&self, _now: DateTime<Utc>) -> Result<usize, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
