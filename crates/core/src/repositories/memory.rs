//! In-memory stores.

use super::{latest_matching, PatientStore, TriageQueueStore};
use crate::admission::{sort_by_priority, AdmissionId, AdmissionRecord, AdmissionState};
use crate::patient::{NationalId, Patient};
use crate::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<BTreeMap<NationalId, Patient>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientStore for InMemoryPatientStore {
    fn find_by_national_id(&self, id: &NationalId) -> CoreResult<Option<Patient>> {
        Ok(self.patients.read()?.get(id).cloned())
    }

    fn create(&self, patient: Patient) -> CoreResult<Patient> {
        let mut patients = self.patients.write()?;
        let stored = patients
            .entry(patient.national_id.clone())
            .or_insert(patient);
        Ok(stored.clone())
    }

    fn list(&self) -> CoreResult<Vec<Patient>> {
        Ok(self.patients.read()?.values().cloned().collect())
    }
}

/// Admissions kept in insertion order behind a single `RwLock`.
///
/// Reads clone a snapshot under the read guard; every write, including the
/// compare-and-update used for claims, holds the write guard for its whole check-then-act.
#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    records: RwLock<Vec<AdmissionRecord>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: &AdmissionId) -> CoreError {
    CoreError::NotFound(format!("admission {id}"))
}

impl TriageQueueStore for InMemoryQueueStore {
    fn insert(&self, record: AdmissionRecord) -> CoreResult<()> {
        let mut records = self.records.write()?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(CoreError::InvalidOperation(format!(
                "admission {} already exists",
                record.id()
            )));
        }
        records.push(record);
        Ok(())
    }

    fn get_pending(&self) -> CoreResult<Vec<AdmissionRecord>> {
        let mut pending: Vec<AdmissionRecord> = self
            .records
            .read()?
            .iter()
            .filter(|r| r.state() == AdmissionState::Pending)
            .cloned()
            .collect();
        sort_by_priority(&mut pending);
        Ok(pending)
    }

    fn get_all(&self) -> CoreResult<Vec<AdmissionRecord>> {
        Ok(self.records.read()?.clone())
    }

    fn find_by_id(&self, id: &AdmissionId) -> CoreResult<Option<AdmissionRecord>> {
        Ok(self.records.read()?.iter().find(|r| r.id() == id).cloned())
    }

    fn find_by_patient_and_state(
        &self,
        patient: &NationalId,
        state: AdmissionState,
    ) -> CoreResult<Option<AdmissionRecord>> {
        let records = self.records.read()?;
        Ok(latest_matching(records.iter().cloned(), patient, state))
    }

    fn update(&self, record: &AdmissionRecord) -> CoreResult<()> {
        let mut records = self.records.write()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| not_found(record.id()))?;
        *slot = record.clone();
        Ok(())
    }

    fn compare_and_update(
        &self,
        record: &AdmissionRecord,
        expected: AdmissionState,
    ) -> CoreResult<()> {
        let mut records = self.records.write()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| not_found(record.id()))?;

        if slot.state() != expected {
            return Err(CoreError::StaleState {
                id: record.id().to_string(),
                expected,
                actual: slot.state(),
            });
        }
        *slot = record.clone();
        Ok(())
    }
}
