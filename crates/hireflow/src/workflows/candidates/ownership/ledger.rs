use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::EmployeeId;

/// Lifecycle of one ownership claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Active,
    Expired,
}

/// One row of the per-candidate claim ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub employee: EmployeeId,
    pub claimed_at: DateTime<Utc>,
    pub status: ClaimStatus,
}

/// Append-only record of every recruiter who ever claimed a candidate.
///
/// At most one entry is `Active` at a time and it names the current owner.
/// Entries are never removed or rewritten apart from the active-to-expired
/// demotion performed by `record_claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationHistory(Vec<HistoryEntry>);

impl RegistrationHistory {
    /// Ledger for a brand-new candidate: a single active claim.
    pub fn first_claim(employee: EmployeeId, now: DateTime<Utc>) -> Self {
        Self(vec![HistoryEntry {
            employee,
            claimed_at: now,
            status: ClaimStatus::Active,
        }])
    }

    /// Demotes the standing active entry and appends a fresh one.
    pub fn record_claim(&mut self, employee: EmployeeId, now: DateTime<Utc>) {
        for entry in &mut self.0 {
            if entry.status == ClaimStatus::Active {
                entry.status = ClaimStatus::Expired;
            }
        }
        self.0.push(HistoryEntry {
            employee,
            claimed_at: now,
            status: ClaimStatus::Active,
        });
    }

    /// Whether the recruiter appears anywhere in the ledger, expired
    /// claims included. Backs the re-marking rejection.
    pub fn contains_claim(&self, employee: &EmployeeId) -> bool {
        self.0.iter().any(|entry| &entry.employee == employee)
    }

    pub fn active_entry(&self) -> Option<&HistoryEntry> {
        self.0.iter().rev().find(|entry| entry.status == ClaimStatus::Active)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn active_count(&self) -> usize {
        self.0
            .iter()
            .filter(|entry| entry.status == ClaimStatus::Active)
            .count()
    }
}
