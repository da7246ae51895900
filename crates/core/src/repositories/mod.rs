//! Storage collaborators for the admission workflow.
//!
//! The services in [`crate::services`] are agnostic to persistence technology; they talk to
//! the two traits defined here. Two implementations ship with the crate:
//!
//! - [`memory`]: process-local stores behind `RwLock`s, the default for the server.
//! - [`file`]: YAML files under the configured data directory, used by the CLI so state
//!   survives between invocations. Processes sharing a directory coordinate through an
//!   advisory lock file (`fs2`).
//!
//! ## Concurrency contract
//!
//! The triage queue store is the only shared mutable resource in the workflow. Every
//! implementation must guarantee:
//!
//! - `get_pending` returns a consistent snapshot: no admission appears twice or is skipped.
//! - `compare_and_update` is atomic with respect to every other write: the stored state is
//!   checked and the new record written under one exclusive section. Services use it as an
//!   optimistic-concurrency token so two physicians can never claim the same admission.

pub mod file;
pub mod memory;

use crate::admission::{AdmissionId, AdmissionRecord, AdmissionState};
use crate::config::{CoreConfig, StoreKind};
use crate::patient::{NationalId, Patient};
use crate::CoreResult;
use guardia_uuid::ArrivalStamp;
use std::sync::Arc;

/// Patient lookup and creation.
pub trait PatientStore: Send + Sync {
    fn find_by_national_id(&self, id: &NationalId) -> CoreResult<Option<Patient>>;

    /// Inserts `patient` unless one with the same national id already exists, and returns
    /// the stored record. Concurrent creation of the same id therefore converges on the
    /// first writer's record.
    fn create(&self, patient: Patient) -> CoreResult<Patient>;

    /// All patients, ordered by national id.
    fn list(&self) -> CoreResult<Vec<Patient>>;
}

/// The triage queue: every admission ever registered, in any state.
pub trait TriageQueueStore: Send + Sync {
    /// Stores a new admission. Fails if the id is already present.
    ///
    /// Stores shared between processes also reject an arrival stamp that does not sort after
    /// every stored one, with [`crate::CoreError::ArrivalOutOfOrder`], so clocks in
    /// different processes cannot interleave out of order.
    fn insert(&self, record: AdmissionRecord) -> CoreResult<()>;

    /// PENDING admissions sorted in triage priority order.
    fn get_pending(&self) -> CoreResult<Vec<AdmissionRecord>>;

    /// Every admission regardless of state, in store-defined order.
    fn get_all(&self) -> CoreResult<Vec<AdmissionRecord>>;

    fn find_by_id(&self, id: &AdmissionId) -> CoreResult<Option<AdmissionRecord>>;

    /// The most recently arrived admission of `patient` in `state`, if any.
    fn find_by_patient_and_state(
        &self,
        patient: &NationalId,
        state: AdmissionState,
    ) -> CoreResult<Option<AdmissionRecord>>;

    /// Unconditionally replaces the stored admission with the same id.
    fn update(&self, record: &AdmissionRecord) -> CoreResult<()>;

    /// Replaces the stored admission only if it is still in `expected`.
    ///
    /// Fails with [`crate::CoreError::StaleState`] if another writer got there first, or
    /// [`crate::CoreError::NotFound`] if the id is unknown.
    fn compare_and_update(&self, record: &AdmissionRecord, expected: AdmissionState)
        -> CoreResult<()>;

    /// Latest arrival stamp stored, used to resume the arrival clock after a restart.
    fn latest_arrival(&self) -> CoreResult<Option<ArrivalStamp>> {
        Ok(self
            .get_all()?
            .iter()
            .map(AdmissionRecord::arrival)
            .max())
    }
}

/// The pair of stores a deployment runs with.
#[derive(Clone)]
pub struct Stores {
    pub patients: Arc<dyn PatientStore>,
    pub queue: Arc<dyn TriageQueueStore>,
}

impl Stores {
    /// Builds the stores selected by `cfg.store()`.
    pub fn from_config(cfg: &CoreConfig) -> CoreResult<Self> {
        let stores = match cfg.store() {
            StoreKind::Memory => Self {
                patients: Arc::new(memory::InMemoryPatientStore::new()),
                queue: Arc::new(memory::InMemoryQueueStore::new()),
            },
            StoreKind::File => Self {
                patients: Arc::new(file::FilePatientStore::open(cfg.patients_dir())?),
                queue: Arc::new(file::FileQueueStore::open(cfg.admissions_dir())?),
            },
        };
        tracing::debug!("using {:?} stores", cfg.store());
        Ok(stores)
    }
}

pub(crate) fn latest_matching(
    records: impl IntoIterator<Item = AdmissionRecord>,
    patient: &NationalId,
    state: AdmissionState,
) -> Option<AdmissionRecord> {
    records
        .into_iter()
        .filter(|r| r.patient_id() == patient && r.state() == state)
        .max_by_key(AdmissionRecord::arrival)
}
