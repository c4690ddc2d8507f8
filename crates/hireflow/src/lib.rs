//! Candidate ownership and lease tracking for staffing pipeline automation.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
