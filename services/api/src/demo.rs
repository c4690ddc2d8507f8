use crate::infra::{InMemoryCandidateRegistry, LoggingNotificationPublisher};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use hireflow::error::AppError;
use hireflow::workflows::candidates::ownership::{
    CandidateOwnershipService, ContactId, EmployeeId, ExpirySweeper, OwnershipError, PipelineStage,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Contact number for the demo candidate
    #[arg(long, default_value = "9000000001")]
    pub(crate) contact: String,
    /// Recruiter who registers the candidate
    #[arg(long, default_value = "asha")]
    pub(crate) first_recruiter: String,
    /// Recruiter who tries to claim the candidate later
    #[arg(long, default_value = "vikram")]
    pub(crate) second_recruiter: String,
    /// Days to jump forward before the second recruiter's claim
    #[arg(long, default_value_t = 31)]
    pub(crate) days_later: i64,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        contact,
        first_recruiter,
        second_recruiter,
        days_later,
    } = args;

    let registry = Arc::new(InMemoryCandidateRegistry::default());
    let notifications = Arc::new(LoggingNotificationPublisher::default());
    let service = CandidateOwnershipService::new(registry.clone(), notifications.clone());

    let contact = ContactId(contact);
    let first = EmployeeId(first_recruiter);
    let second = EmployeeId(second_recruiter);
    let t0 = Utc::now();

    println!("Candidate ownership demo");
    println!(
        "- {} registers candidate {} and creates a lineup",
        first, contact
    );
    service.create(contact.clone(), first.clone(), t0)?;
    let grant = service.acquire_lease(&contact, first.clone(), PipelineStage::Lineup, t0)?;
    print_window(grant.candidate.lock_expiry);

    println!("- {} checks the lock the next day", second);
    let status = service.check_lock(&contact, t0 + Duration::days(1))?;
    println!(
        "  locked={} owner={} remaining_days={:?}",
        status.is_locked, status.owner_id, status.remaining_days
    );

    println!("- {} tries to claim the candidate immediately", second);
    match service.transfer_ownership(&contact, second.clone(), t0 + Duration::days(1)) {
        Err(OwnershipError::LockedByOther { owner, expires }) => {
            println!("  rejected: locked by {} until {}", owner, expires);
        }
        Ok(_) => println!("  unexpected: claim went through"),
        Err(err) => println!("  rejected: {err}"),
    }

    let later = t0 + Duration::days(days_later);
    println!("- {days_later} days pass; the sweeper runs its hygiene pass");
    let sweeper = ExpirySweeper::new(registry, std::time::Duration::from_secs(60));
    match sweeper.sweep_once(later) {
        Ok(cleared) => println!("  cleared {cleared} stale lock flag(s)"),
        Err(err) => println!("  sweep failed: {err}"),
    }

    println!("- {} claims the candidate again", second);
    match service.transfer_ownership(&contact, second.clone(), later) {
        Ok(transfer) => {
            println!(
                "  success: previous owner {} notified, history now {} entries",
                transfer.previous_owner,
                transfer.candidate.history.entries().len()
            );
        }
        Err(err) => println!("  rejected: {err}"),
    }

    println!("- joining details arrive, keyed in by the back office");
    let grant = service.acquire_lease(
        &contact,
        EmployeeId("back-office".to_string()),
        PipelineStage::JoiningReceived,
        later + Duration::days(3),
    )?;
    println!(
        "  lock credited to {} (the recruiter on record)",
        grant.candidate.owner
    );
    print_window(grant.candidate.lock_expiry);

    println!(
        "- {} hand-off notices dispatched in total",
        notifications.notices().len()
    );
    Ok(())
}

fn print_window(expiry: Option<DateTime<Utc>>) {
    match expiry {
        Some(expiry) => println!("  exclusivity window runs until {expiry}"),
        None => println!("  no exclusivity window in force"),
    }
}
