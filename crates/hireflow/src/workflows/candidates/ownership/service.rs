use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::{Candidate, ContactId, EmployeeId, LockStatus, PipelineStage};
use super::registry::{CandidateRegistry, NotificationPublisher, OwnershipNotice, RegistryError};

/// Service arbitrating every ownership and lock mutation for candidates.
///
/// All pipeline workflows route their lock decisions through here so the
/// stage duration and attribution rules live in one place. Operations take
/// an explicit `now` so callers and tests control the clock.
pub struct CandidateOwnershipService<R, N> {
    registry: Arc<R>,
    notifications: Arc<N>,
}

/// Result of a stage event that armed or refreshed an exclusivity window.
#[derive(Debug, Clone)]
pub struct LeaseGrant {
    pub candidate: Candidate,
    /// Populated when arming the lease also moved ownership.
    pub previous_owner: Option<EmployeeId>,
}

/// Result of a successful hand-off to a new recruiter.
#[derive(Debug, Clone)]
pub struct OwnershipTransfer {
    pub candidate: Candidate,
    pub previous_owner: EmployeeId,
}

impl<R, N> CandidateOwnershipService<R, N>
where
    R: CandidateRegistry + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(registry: Arc<R>, notifications: Arc<N>) -> Self {
        Self {
            registry,
            notifications,
        }
    }

    /// Registers a brand-new candidate owned by `employee`, with no lock.
    ///
    /// Exactly one concurrent caller wins the insert. Losers get
    /// `DuplicateCandidate` carrying the standing owner after a single
    /// re-read; there is no blind re-insert, and the caller decides
    /// whether to fall back to a claim or a lock check.
    pub fn create(
        &self,
        contact: ContactId,
        employee: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Candidate, OwnershipError> {
        let candidate = Candidate::register(contact.clone(), employee.clone(), now);
        match self.registry.insert(candidate) {
            Ok(stored) => Ok(stored),
            Err(RegistryError::Duplicate) => match self.registry.fetch(&contact)? {
                Some(existing) => Err(OwnershipError::DuplicateCandidate {
                    contact,
                    owner: Some(existing.owner),
                }),
                // The duplicate vanished between insert and re-read
                // (administrative delete); one more insert, then give up.
                None => match self
                    .registry
                    .insert(Candidate::register(contact.clone(), employee, now))
                {
                    Ok(stored) => Ok(stored),
                    Err(RegistryError::Duplicate) => {
                        Err(OwnershipError::DuplicateCandidate { contact, owner: None })
                    }
                    Err(other) => Err(other.into()),
                },
            },
            Err(other) => Err(other.into()),
        }
    }

    /// Pure read of the lock state, computed lazily from the expiry.
    pub fn check_lock(
        &self,
        contact: &ContactId,
        now: DateTime<Utc>,
    ) -> Result<LockStatus, OwnershipError> {
        let candidate = self.fetch_existing(contact)?;
        Ok(candidate.lock_status(now))
    }

    /// Applies a stage event: records the stage, arms its exclusivity
    /// window, and attributes the lock to the rightful recruiter.
    ///
    /// A later stage event overwrites the window outright; durations are
    /// never merged. Re-acquisition by the standing owner just refreshes
    /// the expiry.
    pub fn acquire_lease(
        &self,
        contact: &ContactId,
        employee: EmployeeId,
        stage: PipelineStage,
        now: DateTime<Utc>,
    ) -> Result<LeaseGrant, OwnershipError> {
        let mut candidate = self.fetch_existing(contact)?;

        // Joining credit belongs to whoever created the lineup, which is
        // the recruiter on record, not necessarily the caller keying in
        // the joining form.
        let locker = match stage {
            PipelineStage::JoiningReceived => candidate.owner.clone(),
            _ => employee,
        };

        let previous_owner = if locker == candidate.owner {
            None
        } else {
            if let Some(expires) = candidate.valid_lock(now) {
                return Err(OwnershipError::LockedByOther {
                    owner: candidate.owner.clone(),
                    expires,
                });
            }
            if candidate.history.contains_claim(&locker) {
                return Err(OwnershipError::AlreadyOwned(locker));
            }
            let previous = candidate.owner.clone();
            candidate.history.record_claim(locker.clone(), now);
            candidate.owner = locker;
            candidate.is_locked = false;
            candidate.lock_expiry = None;
            Some(previous)
        };

        candidate.stage = stage;
        if let Some(window) = stage.lock_window() {
            candidate.is_locked = true;
            candidate.lock_expiry = Some(now + window);
        }

        let stored = self.registry.update(candidate)?;
        if let Some(previous) = &previous_owner {
            self.dispatch_notice(previous, &stored);
        }
        Ok(LeaseGrant {
            candidate: stored,
            previous_owner,
        })
    }

    /// Hands the candidate to a new recruiter.
    ///
    /// Rejected while a valid foreign lock stands, and rejected outright
    /// for any recruiter who already appears in the ledger, current owner
    /// included. The hand-off itself grants no window; the next stage
    /// event arms one.
    pub fn transfer_ownership(
        &self,
        contact: &ContactId,
        employee: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<OwnershipTransfer, OwnershipError> {
        let mut candidate = self.fetch_existing(contact)?;

        if candidate.history.contains_claim(&employee) {
            return Err(OwnershipError::AlreadyOwned(employee));
        }
        if let Some(expires) = candidate.valid_lock(now) {
            return Err(OwnershipError::LockedByOther {
                owner: candidate.owner.clone(),
                expires,
            });
        }

        let previous_owner = candidate.owner.clone();
        candidate.history.record_claim(employee.clone(), now);
        candidate.owner = employee;
        candidate.is_locked = false;
        candidate.lock_expiry = None;

        let stored = self.registry.update(candidate)?;
        self.dispatch_notice(&previous_owner, &stored);
        Ok(OwnershipTransfer {
            candidate: stored,
            previous_owner,
        })
    }

    /// Direct registry handle for maintenance passes mounted next to the
    /// ownership endpoints.
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    fn fetch_existing(&self, contact: &ContactId) -> Result<Candidate, OwnershipError> {
        self.registry
            .fetch(contact)?
            .ok_or_else(|| OwnershipError::NotFound(contact.clone()))
    }

    // Hand-off notices are best-effort; ownership must never fail because
    // the notifier did.
    fn dispatch_notice(&self, previous: &EmployeeId, candidate: &Candidate) {
        let notice = OwnershipNotice {
            recipient: previous.clone(),
            contact_id: candidate.contact.clone(),
            summary: format!(
                "candidate {} is now worked by {}",
                candidate.contact, candidate.owner
            ),
            acting_employee: candidate.owner.clone(),
        };
        if let Err(err) = self.notifications.notify(notice) {
            warn!(
                recipient = %previous,
                contact = %candidate.contact,
                error = %err,
                "ownership notice dropped"
            );
        }
    }
}

/// Error raised by the ownership service.
#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    #[error("candidate {contact} is already registered")]
    DuplicateCandidate {
        contact: ContactId,
        owner: Option<EmployeeId>,
    },
    #[error("no candidate registered for {0}")]
    NotFound(ContactId),
    #[error("candidate is locked by {owner} until {expires}")]
    LockedByOther {
        owner: EmployeeId,
        expires: DateTime<Utc>,
    },
    #[error("recruiter {0} already claimed this candidate")]
    AlreadyOwned(EmployeeId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl OwnershipError {
    /// Stable discriminator for API payloads.
    pub const fn code(&self) -> &'static str {
        match self {
            OwnershipError::DuplicateCandidate { .. } => "duplicate_candidate",
            OwnershipError::NotFound(_) => "not_found",
            OwnershipError::LockedByOther { .. } => "locked_by_other",
            OwnershipError::AlreadyOwned(_) => "already_owned",
            OwnershipError::Registry(RegistryError::StaleWrite) => "write_conflict",
            OwnershipError::Registry(_) => "registry_error",
        }
    }
}
