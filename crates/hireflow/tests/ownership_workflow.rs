//! Integration specifications for the candidate ownership lifecycle.
//!
//! Scenarios drive the public service facade end to end: registration with
//! an immediate lineup window, a competing recruiter probing and claiming
//! the candidate, expiry of the window, and the re-marking rejection. The
//! in-memory infrastructure mirrors what the API service wires up.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, TimeZone, Utc};

    use hireflow::workflows::candidates::ownership::{
        Candidate, CandidateOwnershipService, CandidateRegistry, ContactId, EmployeeId,
        NotificationError, NotificationPublisher, OwnershipNotice, RegistryError,
    };

    pub(super) fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid timestamp")
    }

    pub(super) fn contact() -> ContactId {
        ContactId("9000000001".to_string())
    }

    pub(super) fn recruiter(name: &str) -> EmployeeId {
        EmployeeId(name.to_string())
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
    }

    impl MemoryNotifications {
        pub(super) fn notices(&self) -> Vec<OwnershipNotice> {
            self.notices.lock().expect("notice mutex poisoned").clone()
        }
    }

    impl NotificationPublisher for MemoryNotifications {
        fn notify(&self, notice: OwnershipNotice) -> Result<(), NotificationError> {
            self.notices
                .lock()
                .expect("notice mutex poisoned")
                .push(notice);
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        Arc<CandidateOwnershipService<MemoryRegistry, MemoryNotifications>>,
        Arc<MemoryRegistry>,
        Arc<MemoryNotifications>,
    ) {
        let registry = Arc::new(MemoryRegistry::default());
        let notifications = Arc::new(MemoryNotifications::default());
        let service = Arc::new(CandidateOwnershipService::new(
            registry.clone(),
            notifications.clone(),
        ));
        (service, registry, notifications)
    }
}

use chrono::Duration;
use common::*;
use hireflow::workflows::candidates::ownership::{
    CandidateRegistry, ClaimStatus, ContactId, OwnershipError, PipelineStage,
};
use std::sync::Arc;

#[test]
fn lineup_registration_protects_the_candidate_for_thirty_days() {
    let (service, _, _) = build_service();

    let candidate = service
        .create(contact(), recruiter("emp-a"), t0())
        .expect("registration succeeds");
    assert_eq!(candidate.history.active_count(), 1);

    let grant = service
        .acquire_lease(&contact(), recruiter("emp-a"), PipelineStage::Lineup, t0())
        .expect("lineup lease arms");
    assert!(grant.candidate.is_locked);
    assert_eq!(grant.candidate.lock_expiry, Some(t0() + Duration::days(30)));

    // A competing recruiter probing a day later sees the standing window.
    let status = service
        .check_lock(&contact(), t0() + Duration::days(1))
        .expect("read succeeds");
    assert!(status.is_locked);
    assert_eq!(status.owner_id, recruiter("emp-a"));
    assert_eq!(status.remaining_days, Some(29));
    assert!(status.remaining_time.is_none());
}

#[test]
fn competing_claim_is_blocked_until_the_window_lapses() {
    let (service, _, notifications) = build_service();
    service
        .create(contact(), recruiter("emp-a"), t0())
        .expect("registration succeeds");
    service
        .acquire_lease(&contact(), recruiter("emp-a"), PipelineStage::Lineup, t0())
        .expect("lineup lease arms");

    match service.transfer_ownership(&contact(), recruiter("emp-b"), t0() + Duration::days(10)) {
        Err(OwnershipError::LockedByOther { owner, .. }) => {
            assert_eq!(owner, recruiter("emp-a"));
        }
        other => panic!("expected locked by other, got {other:?}"),
    }
    assert!(notifications.notices().is_empty());

    let transfer = service
        .transfer_ownership(&contact(), recruiter("emp-b"), t0() + Duration::days(31))
        .expect("window lapsed, hand-off succeeds");

    assert_eq!(transfer.previous_owner, recruiter("emp-a"));
    let entries = transfer.candidate.history.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].employee, recruiter("emp-a"));
    assert_eq!(entries[0].status, ClaimStatus::Expired);
    assert_eq!(entries[1].employee, recruiter("emp-b"));
    assert_eq!(entries[1].status, ClaimStatus::Active);

    // The hand-off cleared the stage lock; a fresh stage event must arm
    // the next window.
    let status = service
        .check_lock(&contact(), t0() + Duration::days(31))
        .expect("read succeeds");
    assert!(!status.is_locked);

    let notices = notifications.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].recipient, recruiter("emp-a"));
    assert_eq!(notices[0].acting_employee, recruiter("emp-b"));
}

#[test]
fn owner_cannot_re_mark_their_own_candidate() {
    let (service, _, _) = build_service();
    service
        .create(contact(), recruiter("emp-a"), t0())
        .expect("registration succeeds");

    match service.transfer_ownership(&contact(), recruiter("emp-a"), t0() + Duration::days(1)) {
        Err(OwnershipError::AlreadyOwned(employee)) => {
            assert_eq!(employee, recruiter("emp-a"));
        }
        other => panic!("expected already owned, got {other:?}"),
    }
}

#[test]
fn selection_and_joining_keep_credit_with_the_lineup_creator() {
    let (service, _, _) = build_service();
    service
        .create(contact(), recruiter("emp-a"), t0())
        .expect("registration succeeds");
    service
        .acquire_lease(&contact(), recruiter("emp-a"), PipelineStage::Lineup, t0())
        .expect("lineup lease arms");
    service
        .acquire_lease(
            &contact(),
            recruiter("emp-a"),
            PipelineStage::Selected,
            t0() + Duration::days(7),
        )
        .expect("selection extends the window");

    let grant = service
        .acquire_lease(
            &contact(),
            recruiter("emp-backoffice"),
            PipelineStage::JoiningReceived,
            t0() + Duration::days(14),
        )
        .expect("joining keyed in by back office");

    assert_eq!(grant.candidate.owner, recruiter("emp-a"));
    assert_eq!(
        grant.candidate.lock_expiry,
        Some(t0() + Duration::days(104))
    );
    assert_eq!(grant.candidate.history.entries().len(), 1);
}

#[test]
fn at_most_one_active_entry_across_the_whole_lifecycle() {
    let (service, registry, _) = build_service();
    service
        .create(contact(), recruiter("emp-a"), t0())
        .expect("registration succeeds");

    let mut at = t0();
    for name in ["emp-b", "emp-c", "emp-d"] {
        at += Duration::days(1);
        service
            .transfer_ownership(&contact(), recruiter(name), at)
            .expect("unlocked hand-off succeeds");
        let stored = registry
            .fetch(&contact())
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(stored.history.active_count(), 1);
        assert_eq!(stored.owner, recruiter(name));
    }
}

#[test]
fn concurrent_registration_admits_exactly_one_winner() {
    let (service, registry, _) = build_service();
    let workers = 8;

    let handles: Vec<_> = (0..workers)
        .map(|index| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                service.create(
                    ContactId("9000000042".to_string()),
                    recruiter(&format!("emp-{index}")),
                    t0(),
                )
            })
        })
        .collect();

    let mut wins = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.join().expect("worker thread finishes") {
            Ok(_) => wins += 1,
            Err(OwnershipError::DuplicateCandidate { owner, .. }) => {
                assert!(owner.is_some(), "losers observe the standing owner");
                duplicates += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(duplicates, workers - 1);

    let stored = registry
        .fetch(&ContactId("9000000042".to_string()))
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.history.active_count(), 1);
}
