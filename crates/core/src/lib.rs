//! # guardia core
//!
//! Core business logic for the emergency-department admission workflow.
//!
//! A triage nurse registers an arriving patient's vitals and triage level; the admission
//! enters a priority queue; a physician claims the highest-priority waiting admission; the
//! claim is either cancelled back into the queue or finalised with the physician's report.
//!
//! This crate contains:
//! - validated value types ([`vitals`], [`triage`], [`identity`], [`patient`])
//! - the [`admission`] aggregate with its priority order and state machine
//! - storage collaborators ([`repositories`]) with in-memory and YAML file implementations
//! - the workflow [`services`]
//!
//! **No API concerns**: HTTP routing, request DTOs and authentication belong in
//! `api-shared` and `api-rest`.

pub mod admission;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod patient;
pub mod repositories;
pub mod services;
pub mod triage;
pub mod vitals;

pub use admission::{AdmissionId, AdmissionRecord, AdmissionState, AttentionRecord};
pub use config::{CoreConfig, StoreKind};
pub use constants::DEFAULT_DATA_DIR;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use guardia_types::NonEmptyText;
pub use guardia_uuid::{ArrivalClock, ArrivalStamp, ShardableUuid};
pub use identity::{Clinician, Doctor, Nurse};
pub use patient::{Address, NationalId, Patient, PatientDemographics};
pub use repositories::{PatientStore, Stores, TriageQueueStore};
pub use services::{AdmissionService, AttentionService, UrgencyRequest};
pub use triage::TriageLevel;
pub use vitals::{VitalReadings, VitalSigns};
