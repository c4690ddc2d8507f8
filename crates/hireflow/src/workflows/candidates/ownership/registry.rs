use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Candidate, ContactId, EmployeeId};

/// Storage abstraction over the authoritative candidate store.
///
/// `insert` guarantees contact-id uniqueness: of any number of concurrent
/// inserts for one contact, exactly one succeeds and the rest observe
/// `Duplicate`. `update` is a compare-and-set on `Candidate::revision`:
/// the write only applies while the stored revision still matches the one
/// the caller read, and the revision is bumped on success. Losers observe
/// `StaleWrite` and must re-read rather than overwrite.
pub trait CandidateRegistry: Send + Sync {
    fn insert(&self, candidate: Candidate) -> Result<Candidate, RegistryError>;
    fn fetch(&self, contact: &ContactId) -> Result<Option<Candidate>, RegistryError>;
    fn update(&self, candidate: Candidate) -> Result<Candidate, RegistryError>;
    /// Conditional bulk pass clearing every lock whose window already
    /// closed. Idempotent; returns how many records were cleared.
    fn clear_expired_locks(&self, now: DateTime<Utc>) -> Result<usize, RegistryError>;
}

/// Error enumeration for registry failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("candidate already registered")]
    Duplicate,
    #[error("candidate not found")]
    NotFound,
    #[error("candidate was modified concurrently")]
    StaleWrite,
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hand-off hook (e.g. mail or in-app feed adapters).
///
/// Dispatch is best-effort from the engine's point of view; implementations
/// should not block on slow transports.
pub trait NotificationPublisher: Send + Sync {
    fn notify(&self, notice: OwnershipNotice) -> Result<(), NotificationError>;
}

/// Payload sent to the recruiter whose candidate moved to someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipNotice {
    pub recipient: EmployeeId,
    pub contact_id: ContactId,
    pub summary: String,
    pub acting_employee: EmployeeId,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
