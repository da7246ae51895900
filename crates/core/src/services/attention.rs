//! Finalisation of claimed admissions.

use super::{NO_IN_PROGRESS_ADMISSION, ONLY_IN_PROGRESS_ATTENDED, PHYSICIAN_REQUIRED};
use crate::admission::{AdmissionRecord, AdmissionState, AttentionRecord};
use crate::identity::Doctor;
use crate::patient::NationalId;
use crate::repositories::{Stores, TriageQueueStore};
use crate::{CoreError, CoreResult, NonEmptyText};
use std::sync::Arc;

#[derive(Clone)]
pub struct AttentionService {
    queue: Arc<dyn TriageQueueStore>,
}

impl AttentionService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            queue: stores.queue.clone(),
        }
    }

    /// Records the physician's report on an IN_PROGRESS admission and finalises it.
    ///
    /// Preconditions are checked in order and the first failure wins:
    /// 1. `admission` present, else `NullArgument`.
    /// 2. `physician` present, else `NullArgument`.
    /// 3. `physician_note` not blank, else `Validation("physician note is mandatory")`.
    /// 4. the stored admission is IN_PROGRESS, else
    ///    `InvalidOperation("only in-progress admissions may be attended")`.
    ///
    /// The state check runs against the stored record, not the caller's copy, so attending
    /// the same admission twice fails the second time even with a stale copy in hand.
    /// A physician already assigned to the attention record (normally the one who claimed
    /// it) is never overwritten.
    pub fn register_attention(
        &self,
        admission: Option<&AdmissionRecord>,
        physician_note: &str,
        physician: Option<&Doctor>,
    ) -> CoreResult<AttentionRecord> {
        let admission =
            admission.ok_or_else(|| CoreError::NullArgument("admission is required".into()))?;
        let physician =
            physician.ok_or_else(|| CoreError::NullArgument(PHYSICIAN_REQUIRED.into()))?;
        let note = NonEmptyText::new(physician_note)
            .map_err(|_| CoreError::Validation("physician note is mandatory".into()))?;

        let mut current = self
            .queue
            .find_by_id(admission.id())?
            .ok_or_else(|| CoreError::NotFound(format!("admission {}", admission.id())))?;
        if current.state() != AdmissionState::InProgress {
            return Err(CoreError::InvalidOperation(ONLY_IN_PROGRESS_ATTENDED.into()));
        }

        let attention = current.attention_mut();
        attention.append_physician_note(&note);
        if !attention.assign_physician_if_unset(physician) {
            tracing::debug!(
                admission = %admission.id(),
                "keeping previously assigned physician"
            );
        }
        current.transition(AdmissionState::Finalized)?;

        self.queue
            .compare_and_update(&current, AdmissionState::InProgress)
            .map_err(|e| match e {
                CoreError::StaleState { .. } => {
                    CoreError::InvalidOperation(ONLY_IN_PROGRESS_ATTENDED.into())
                }
                other => other,
            })?;

        tracing::info!(
            admission = %current.id(),
            patient = %current.patient_id(),
            physician = %physician,
            "finalised admission"
        );
        Ok(current.attention().clone())
    }

    /// Attends the patient's IN_PROGRESS admission.
    pub fn attend_patient(
        &self,
        patient_id: &str,
        physician_note: &str,
        physician: Option<&Doctor>,
    ) -> CoreResult<AttentionRecord> {
        if physician.is_none() {
            return Err(CoreError::NullArgument(PHYSICIAN_REQUIRED.into()));
        }
        let national_id = NationalId::parse(patient_id)?;
        let admission = self
            .queue
            .find_by_patient_and_state(&national_id, AdmissionState::InProgress)?
            .ok_or_else(|| CoreError::InvalidOperation(NO_IN_PROGRESS_ADMISSION.into()))?;

        self.register_attention(Some(&admission), physician_note, physician)
    }
}
