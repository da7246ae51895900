//! Identifier and arrival-ordering utilities.
//!
//! guardia identifies every admission with a *canonical* UUID: **32 lowercase hexadecimal
//! characters** (no hyphens), the same value produced by `Uuid::new_v4().simple()`.
//! The canonical form doubles as a storage key: the file-backed queue store shards
//! admissions under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/` to avoid large fan-out in a
//! single directory.
//!
//! The second concern of this crate is arrival ordering. Patients with the same triage
//! level are seen first-come-first-served, so every admission carries an [`ArrivalStamp`]
//! issued by a process-wide [`ArrivalClock`]. Stamps are strictly increasing: two
//! admissions registered in the same millisecond still receive distinct, ordered stamps,
//! and the embedded sequence number gives a deterministic tie-break for stamps built by hand.

mod arrival;
mod service;

pub use arrival::{ArrivalClock, ArrivalStamp};
pub use service::ShardableUuid;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
