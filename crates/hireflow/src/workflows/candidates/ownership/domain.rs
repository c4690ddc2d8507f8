use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::{HistoryEntry, RegistrationHistory};

/// Identifier wrapper for a candidate's unique contact number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub String);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for recruiting staff.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline stages that reach the ownership engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Registered,
    Lineup,
    WalkIn,
    JoiningReceived,
    Selected,
}

impl PipelineStage {
    pub const fn label(self) -> &'static str {
        match self {
            PipelineStage::Registered => "registered",
            PipelineStage::Lineup => "lineup",
            PipelineStage::WalkIn => "walk_in",
            PipelineStage::JoiningReceived => "joining_received",
            PipelineStage::Selected => "selected",
        }
    }

    /// Exclusivity window granted when a candidate reaches this stage.
    /// Stages without a window leave the lock fields untouched.
    pub fn lock_window(self) -> Option<Duration> {
        match self {
            PipelineStage::Lineup => Some(Duration::days(30)),
            PipelineStage::JoiningReceived | PipelineStage::Selected => Some(Duration::days(90)),
            PipelineStage::Registered | PipelineStage::WalkIn => None,
        }
    }
}

/// Durable candidate record keyed by contact id.
///
/// The history ledger travels inside the record so the owner field and the
/// ledger can only change together in one registry write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub contact: ContactId,
    pub stage: PipelineStage,
    pub owner: EmployeeId,
    pub is_locked: bool,
    pub lock_expiry: Option<DateTime<Utc>>,
    pub history: RegistrationHistory,
    pub registered_at: DateTime<Utc>,
    /// Bumped by the registry on every accepted update; see
    /// `CandidateRegistry::update`.
    pub revision: u64,
}

impl Candidate {
    /// Fresh record at the registration stage: one active claim, no lock.
    pub fn register(contact: ContactId, employee: EmployeeId, now: DateTime<Utc>) -> Self {
        Self {
            contact,
            stage: PipelineStage::Registered,
            owner: employee.clone(),
            is_locked: false,
            lock_expiry: None,
            history: RegistrationHistory::first_claim(employee, now),
            registered_at: now,
            revision: 0,
        }
    }

    /// Expiry of the lock that is still in force, if any.
    ///
    /// The stored flag is a cached hint; a lock whose expiry has passed is
    /// unlocked no matter what the flag says, sweeper or no sweeper.
    pub fn valid_lock(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lock_expiry
            .filter(|expiry| self.is_locked && *expiry > now)
    }

    pub fn holds_valid_lock(&self, now: DateTime<Utc>) -> bool {
        self.valid_lock(now).is_some()
    }

    pub fn lock_status(&self, now: DateTime<Utc>) -> LockStatus {
        match self.valid_lock(now) {
            Some(expiry) => {
                let remaining = expiry - now;
                let (remaining_days, remaining_time) = if remaining < Duration::hours(24) {
                    (None, Some(format_remaining(remaining)))
                } else {
                    (Some(ceil_days(remaining)), None)
                };
                LockStatus {
                    contact_id: self.contact.clone(),
                    is_locked: true,
                    owner_id: self.owner.clone(),
                    lock_expiry: Some(expiry),
                    remaining_days,
                    remaining_time,
                }
            }
            None => LockStatus {
                contact_id: self.contact.clone(),
                is_locked: false,
                owner_id: self.owner.clone(),
                lock_expiry: None,
                remaining_days: None,
                remaining_time: None,
            },
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> CandidateView {
        let lock = self.valid_lock(now);
        CandidateView {
            contact_id: self.contact.clone(),
            stage: self.stage.label(),
            owner_id: self.owner.clone(),
            is_locked: lock.is_some(),
            lock_expiry: lock,
            history: self.history.entries().to_vec(),
        }
    }
}

/// Snapshot returned by the lock read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub contact_id: ContactId,
    pub is_locked: bool,
    pub owner_id: EmployeeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_expiry: Option<DateTime<Utc>>,
    /// Ceiling of days left; populated when at least a day remains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_days: Option<i64>,
    /// "H:MM" countdown; populated once less than a day remains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<String>,
}

/// Sanitized representation of a candidate for pipeline callers.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub contact_id: ContactId,
    pub stage: &'static str,
    pub owner_id: EmployeeId,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_expiry: Option<DateTime<Utc>>,
    pub history: Vec<HistoryEntry>,
}

fn ceil_days(remaining: Duration) -> i64 {
    (remaining.num_seconds() + 86_399) / 86_400
}

fn format_remaining(remaining: Duration) -> String {
    format!(
        "{}:{:02}",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    )
}
