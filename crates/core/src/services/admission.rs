//! Urgency registration and queue transitions.

use super::{NO_IN_PROGRESS_ADMISSION, NO_PATIENTS_WAITING, PHYSICIAN_REQUIRED};
use crate::admission::{AdmissionRecord, AdmissionState};
use crate::config::CoreConfig;
use crate::identity::{Doctor, Nurse};
use crate::patient::{NationalId, Patient, PatientDemographics};
use crate::repositories::{PatientStore, Stores, TriageQueueStore};
use crate::triage::TriageLevel;
use crate::vitals::{VitalReadings, VitalSigns};
use crate::{CoreError, CoreResult, NonEmptyText};
use chrono::Utc;
use guardia_uuid::ArrivalClock;
use std::sync::Arc;

/// Everything a triage nurse submits when a patient arrives.
#[derive(Clone, Debug)]
pub struct UrgencyRequest {
    /// National id as typed; normalised before lookup.
    pub patient_id: String,
    pub nurse: Nurse,
    pub note: String,
    pub triage_level: TriageLevel,
    pub vitals: VitalReadings,
    /// Used only when the patient is not on file yet.
    pub demographics: PatientDemographics,
}

/// Orchestrates the emergency queue: registration, claiming and cancellation.
#[derive(Clone)]
pub struct AdmissionService {
    cfg: Arc<CoreConfig>,
    patients: Arc<dyn PatientStore>,
    queue: Arc<dyn TriageQueueStore>,
    clock: Arc<ArrivalClock>,
}

impl AdmissionService {
    pub fn new(cfg: Arc<CoreConfig>, stores: &Stores, clock: Arc<ArrivalClock>) -> Self {
        Self {
            cfg,
            patients: stores.patients.clone(),
            queue: stores.queue.clone(),
            clock,
        }
    }

    /// Registers a new urgency and places the patient in the queue.
    ///
    /// If the patient is not on file a placeholder record is created first, built from
    /// `request.demographics` with sentinel values for anything missing.
    ///
    /// # Errors
    ///
    /// - `Validation("note is mandatory")` if the note is blank.
    /// - `Validation("<vital> cannot be negative")` for the first invalid vital.
    /// - `Validation` if the patient id is not a valid national id.
    /// - storage errors from either store.
    pub fn register_urgency(&self, request: UrgencyRequest) -> CoreResult<AdmissionRecord> {
        let note = NonEmptyText::new(&request.note)
            .map_err(|_| CoreError::Validation("note is mandatory".into()))?;
        let vitals = VitalSigns::from_readings(&request.vitals)?;
        let national_id = NationalId::parse(&request.patient_id)?;

        let patient = match self.patients.find_by_national_id(&national_id)? {
            Some(patient) => patient,
            None => {
                let placeholder = Patient::placeholder(
                    national_id,
                    &request.demographics,
                    self.cfg.default_locality(),
                    Utc::now(),
                );
                let stored = self.patients.create(placeholder)?;
                tracing::info!(
                    "created placeholder patient {} ({})",
                    stored.national_id,
                    stored.full_name()
                );
                stored
            }
        };

        let record = loop {
            let record = AdmissionRecord::new(
                patient.clone(),
                request.nurse.clone(),
                request.triage_level,
                vitals,
                note.clone(),
                self.clock.next(),
            );
            match self.queue.insert(record.clone()) {
                Ok(()) => break record,
                Err(CoreError::ArrivalOutOfOrder { latest }) => {
                    tracing::debug!("arrival clock behind the store, re-stamping");
                    self.clock.observe(latest);
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            admission = %record.id(),
            patient = %record.patient_id(),
            triage = %record.triage_level(),
            "registered urgency"
        );
        Ok(record)
    }

    /// PENDING admissions in triage priority order.
    pub fn get_pending_admissions(&self) -> CoreResult<Vec<AdmissionRecord>> {
        self.queue.get_pending()
    }

    /// Every admission regardless of state, for dashboards rather than triage decisions.
    pub fn get_all_admissions(&self) -> CoreResult<Vec<AdmissionRecord>> {
        self.queue.get_all()
    }

    pub fn find_patient(&self, patient_id: &str) -> CoreResult<Option<Patient>> {
        let national_id = NationalId::parse(patient_id)?;
        self.patients.find_by_national_id(&national_id)
    }

    pub fn list_patients(&self) -> CoreResult<Vec<Patient>> {
        self.patients.list()
    }

    /// Claims the highest-priority PENDING admission for `physician`.
    ///
    /// Candidates are tried in priority order, each with a compare-and-update that only
    /// succeeds while the stored record is still PENDING. Losing that race to another
    /// physician moves on to the next candidate, so concurrent claimants never receive the
    /// same admission.
    ///
    /// # Errors
    ///
    /// - `NullArgument("physician is required")` if `physician` is `None`.
    /// - `InvalidOperation("no patients waiting")` if nothing is left to claim.
    pub fn claim_next_patient(&self, physician: Option<&Doctor>) -> CoreResult<AdmissionRecord> {
        let physician =
            physician.ok_or_else(|| CoreError::NullArgument(PHYSICIAN_REQUIRED.into()))?;

        loop {
            let pending = self.queue.get_pending()?;
            if pending.is_empty() {
                return Err(CoreError::InvalidOperation(NO_PATIENTS_WAITING.into()));
            }

            for mut candidate in pending {
                candidate.transition(AdmissionState::InProgress)?;
                candidate.attention_mut().assign_physician_if_unset(physician);

                match self
                    .queue
                    .compare_and_update(&candidate, AdmissionState::Pending)
                {
                    Ok(()) => {
                        tracing::info!(
                            admission = %candidate.id(),
                            patient = %candidate.patient_id(),
                            physician = %physician,
                            "claimed admission"
                        );
                        return Ok(candidate);
                    }
                    Err(CoreError::StaleState { .. }) | Err(CoreError::NotFound(_)) => {
                        tracing::warn!(
                            admission = %candidate.id(),
                            "admission claimed concurrently, trying next candidate"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    /// Returns the patient's IN_PROGRESS admission to the queue.
    ///
    /// The admission keeps its triage level and arrival stamp, so it resumes its previous
    /// position among unchanged peers. The claiming physician is released.
    ///
    /// # Errors
    ///
    /// `InvalidOperation("no in-progress admission found for patient")` if the patient has
    /// no claimed admission, including when a concurrent finalisation wins the race.
    pub fn cancel_attention(&self, patient_id: &str) -> CoreResult<()> {
        let national_id = NationalId::parse(patient_id)?;
        let mut record = self
            .queue
            .find_by_patient_and_state(&national_id, AdmissionState::InProgress)?
            .ok_or_else(|| CoreError::InvalidOperation(NO_IN_PROGRESS_ADMISSION.into()))?;

        record.transition(AdmissionState::Pending)?;
        let released = record.attention_mut().release_physician();

        self.queue
            .compare_and_update(&record, AdmissionState::InProgress)
            .map_err(|e| match e {
                CoreError::StaleState { .. } => {
                    CoreError::InvalidOperation(NO_IN_PROGRESS_ADMISSION.into())
                }
                other => other,
            })?;

        tracing::info!(
            admission = %record.id(),
            patient = %national_id,
            "cancelled attention, released {}",
            released.map(|d| d.to_string()).unwrap_or_else(|| "nobody".into())
        );
        Ok(())
    }
}
