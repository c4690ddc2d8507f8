//! Candidate ownership claims, exclusivity windows, and hand-off rules.
//!
//! Every pipeline workflow that can claim credit for a candidate routes
//! through the service here: the stage-to-window table, the lazy expiry
//! rule, and the claim ledger live in one place so lineup, walk-in, and
//! joining call sites cannot drift apart.

pub mod domain;
pub mod ledger;
pub mod registry;
pub mod router;
pub mod service;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use domain::{Candidate, CandidateView, ContactId, EmployeeId, LockStatus, PipelineStage};
pub use ledger::{ClaimStatus, HistoryEntry, RegistrationHistory};
pub use registry::{
    CandidateRegistry, NotificationError, NotificationPublisher, OwnershipNotice, RegistryError,
};
pub use router::ownership_router;
pub use service::{
    CandidateOwnershipService, LeaseGrant, OwnershipError, OwnershipTransfer,
};
pub use sweeper::ExpirySweeper;
