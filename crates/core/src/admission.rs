//! The admission (ingreso) aggregate.
//!
//! An [`AdmissionRecord`] is one episode of a patient waiting in, or being seen from, the
//! emergency queue. It owns a snapshot of the patient, the reporting nurse, the triage level,
//! the validated vitals, its lifecycle state, its arrival stamp and exactly one
//! [`AttentionRecord`].
//!
//! ## Lifecycle
//!
//! ```text
//! PENDING ──claim──▶ IN_PROGRESS ──attend──▶ FINALIZED
//!    ▲                    │
//!    └──────cancel────────┘
//! ```
//!
//! ## Priority order
//!
//! Admissions are ranked by triage rank ascending, then by arrival ascending, with the
//! arrival sequence number as the final tie-break. Triage level and arrival never change
//! after creation, so a cancelled claim resumes its original place in the queue.

use crate::constants::PHYSICIAN_NOTE_SEPARATOR;
use crate::identity::{Doctor, Nurse};
use crate::patient::{NationalId, Patient};
use crate::triage::TriageLevel;
use crate::vitals::VitalSigns;
use crate::{CoreError, CoreResult, NonEmptyText};
use chrono::{DateTime, Utc};
use guardia_uuid::{ArrivalStamp, ShardableUuid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Identifier of a single admission.
pub type AdmissionId = ShardableUuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionState {
    Pending,
    InProgress,
    Finalized,
}

impl AdmissionState {
    /// Returns true if `to` is a legal next state.
    pub const fn can_transition_to(self, to: AdmissionState) -> bool {
        matches!(
            (self, to),
            (AdmissionState::Pending, AdmissionState::InProgress)
                | (AdmissionState::InProgress, AdmissionState::Finalized)
                | (AdmissionState::InProgress, AdmissionState::Pending)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, AdmissionState::Finalized)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AdmissionState::Pending => "PENDING",
            AdmissionState::InProgress => "IN_PROGRESS",
            AdmissionState::Finalized => "FINALIZED",
        }
    }
}

impl fmt::Display for AdmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING" => Ok(AdmissionState::Pending),
            "IN_PROGRESS" => Ok(AdmissionState::InProgress),
            "FINALIZED" | "FINALISED" => Ok(AdmissionState::Finalized),
            _ => Err(CoreError::Validation(format!(
                "unknown admission state '{}'",
                s.trim()
            ))),
        }
    }
}

/// Narrative and physician assignment for an admission.
///
/// The narrative starts as the nurse's triage note. When the admission is attended the
/// physician's report is appended after [`PHYSICIAN_NOTE_SEPARATOR`], keeping both texts
/// intact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionRecord {
    report: NonEmptyText,
    physician: Option<Doctor>,
}

impl AttentionRecord {
    pub fn new(nurse_note: NonEmptyText) -> Self {
        Self {
            report: nurse_note,
            physician: None,
        }
    }

    /// The nurse's note, followed by the physician's once the admission is finalised.
    pub fn report(&self) -> &str {
        self.report.as_str()
    }

    pub fn physician(&self) -> Option<&Doctor> {
        self.physician.as_ref()
    }

    /// Assigns `doctor` unless a physician is already recorded. Returns whether it assigned.
    pub(crate) fn assign_physician_if_unset(&mut self, doctor: &Doctor) -> bool {
        if self.physician.is_some() {
            return false;
        }
        self.physician = Some(doctor.clone());
        true
    }

    pub(crate) fn release_physician(&mut self) -> Option<Doctor> {
        self.physician.take()
    }

    pub(crate) fn append_physician_note(&mut self, note: &NonEmptyText) {
        self.report = self.report.join(PHYSICIAN_NOTE_SEPARATOR, note);
    }
}

/// Sort key implementing the triage priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    rank: u8,
    arrival: ArrivalStamp,
}

/// One episode of a patient in the emergency queue; the aggregate root.
///
/// Fields are private: the state only moves through [`AdmissionRecord::transition`], and
/// the triage level and arrival stamp never change after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    id: AdmissionId,
    patient: Patient,
    nurse: Nurse,
    triage_level: TriageLevel,
    state: AdmissionState,
    arrival: ArrivalStamp,
    vitals: VitalSigns,
    attention: AttentionRecord,
}

impl AdmissionRecord {
    /// Creates a new PENDING admission with an attention record seeded from `nurse_note`.
    pub fn new(
        patient: Patient,
        nurse: Nurse,
        triage_level: TriageLevel,
        vitals: VitalSigns,
        nurse_note: NonEmptyText,
        arrival: ArrivalStamp,
    ) -> Self {
        Self {
            id: AdmissionId::new(),
            patient,
            nurse,
            triage_level,
            state: AdmissionState::Pending,
            arrival,
            vitals,
            attention: AttentionRecord::new(nurse_note),
        }
    }

    /// Canonical id, also the storage key of the file store.
    pub fn id(&self) -> &AdmissionId {
        &self.id
    }

    /// The patient as it was on file (or synthesised) at registration.
    pub fn patient(&self) -> &Patient {
        &self.patient
    }

    /// Shorthand for `patient().national_id`.
    pub fn patient_id(&self) -> &NationalId {
        &self.patient.national_id
    }

    /// The triage nurse who registered the urgency.
    pub fn nurse(&self) -> &Nurse {
        &self.nurse
    }

    pub fn triage_level(&self) -> TriageLevel {
        self.triage_level
    }

    pub fn state(&self) -> AdmissionState {
        self.state
    }

    /// Arrival stamp, the first-come-first-served component of the priority order.
    pub fn arrival(&self) -> ArrivalStamp {
        self.arrival
    }

    /// Wall-clock part of [`AdmissionRecord::arrival`].
    pub fn arrived_at(&self) -> DateTime<Utc> {
        self.arrival.arrived_at()
    }

    pub fn vitals(&self) -> &VitalSigns {
        &self.vitals
    }

    /// Report so far and the assigned physician, if any.
    pub fn attention(&self) -> &AttentionRecord {
        &self.attention
    }

    pub(crate) fn attention_mut(&mut self) -> &mut AttentionRecord {
        &mut self.attention
    }

    /// Key for [`sort_by_priority`]: triage rank first, then arrival.
    ///
    /// # Returns
    /// * `PriorityKey` - Smaller keys are seen first.
    pub fn priority_key(&self) -> PriorityKey {
        PriorityKey {
            rank: self.triage_level.rank(),
            arrival: self.arrival,
        }
    }

    /// Compares by triage priority. `None` ranks below any admission.
    pub fn compare(&self, other: Option<&AdmissionRecord>) -> Ordering {
        match other {
            Some(other) => self.priority_key().cmp(&other.priority_key()),
            None => Ordering::Less,
        }
    }

    /// Moves to `to` if the edge is legal. Only the state changes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for any edge other than PENDING→IN_PROGRESS,
    /// IN_PROGRESS→FINALIZED or IN_PROGRESS→PENDING. The record is left untouched.
    pub fn transition(&mut self, to: AdmissionState) -> CoreResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

/// Sorts admissions into triage priority order.
pub fn sort_by_priority(admissions: &mut [AdmissionRecord]) {
    admissions.sort_by_key(AdmissionRecord::priority_key);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::patient::PatientDemographics;
    use crate::vitals::VitalReadings;
    use chrono::TimeZone;

    pub fn nurse() -> Nurse {
        Nurse::new("Marta Ruiz", "MN-908").unwrap()
    }

    pub fn doctor(name: &str) -> Doctor {
        Doctor::new(name, format!("MP-{}", name.len())).unwrap()
    }

    pub fn vitals() -> VitalSigns {
        VitalSigns::from_readings(&VitalReadings {
            temperature: 37.2,
            heart_rate: 88.0,
            respiratory_rate: 18.0,
            systolic_pressure: 130.0,
            diastolic_pressure: 85.0,
        })
        .unwrap()
    }

    pub fn stamp(minute: u32, sequence: u64) -> ArrivalStamp {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 10, minute, 0).unwrap();
        ArrivalStamp::new(at, sequence)
    }

    pub fn admission(national_id: &str, level: TriageLevel, arrival: ArrivalStamp) -> AdmissionRecord {
        let locality = NonEmptyText::new("Tafí Viejo").unwrap();
        let patient = Patient::placeholder(
            NationalId::parse(national_id).unwrap(),
            &PatientDemographics::default(),
            &locality,
            arrival.arrived_at(),
        );
        AdmissionRecord::new(
            patient,
            nurse(),
            level,
            vitals(),
            NonEmptyText::new("dolor torácico").unwrap(),
            arrival,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_new_admission_is_pending_with_seeded_attention() {
        let record = admission("20301234563", TriageLevel::Urgent, stamp(0, 0));

        assert_eq!(record.state(), AdmissionState::Pending);
        assert_eq!(record.attention().report(), "dolor torácico");
        assert!(record.attention().physician().is_none());
    }

    #[test]
    fn test_compare_orders_by_rank_first() {
        let early_minor = admission("1", TriageLevel::MinorUrgent, stamp(0, 0));
        let late_critical = admission("2", TriageLevel::Critical, stamp(30, 1));

        assert_eq!(late_critical.compare(Some(&early_minor)), Ordering::Less);
        assert_eq!(early_minor.compare(Some(&late_critical)), Ordering::Greater);
    }

    #[test]
    fn test_compare_orders_by_arrival_within_level() {
        let first = admission("1", TriageLevel::Urgent, stamp(5, 0));
        let second = admission("2", TriageLevel::Urgent, stamp(6, 1));

        assert_eq!(first.compare(Some(&second)), Ordering::Less);
        assert_eq!(second.compare(Some(&first)), Ordering::Greater);
    }

    #[test]
    fn test_compare_equal_keys_and_sequence_tie_break() {
        let a = admission("1", TriageLevel::Urgent, stamp(5, 3));
        let same_key = admission("2", TriageLevel::Urgent, stamp(5, 3));
        let later_seq = admission("3", TriageLevel::Urgent, stamp(5, 4));

        assert_eq!(a.compare(Some(&same_key)), Ordering::Equal);
        assert_eq!(a.compare(Some(&later_seq)), Ordering::Less);
    }

    #[test]
    fn test_compare_against_none_is_less() {
        let a = admission("1", TriageLevel::NonUrgent, stamp(0, 0));
        assert_eq!(a.compare(None), Ordering::Less);
    }

    #[test]
    fn test_compare_is_transitive_over_all_levels() {
        let mut records: Vec<AdmissionRecord> = TriageLevel::ALL
            .iter()
            .rev()
            .enumerate()
            .map(|(i, level)| admission(&i.to_string(), *level, stamp(i as u32, i as u64)))
            .collect();

        sort_by_priority(&mut records);
        let levels: Vec<TriageLevel> = records.iter().map(|r| r.triage_level()).collect();
        assert_eq!(levels, TriageLevel::ALL.to_vec());

        for window in records.windows(3) {
            assert_eq!(window[0].compare(Some(&window[1])), Ordering::Less);
            assert_eq!(window[1].compare(Some(&window[2])), Ordering::Less);
            assert_eq!(window[0].compare(Some(&window[2])), Ordering::Less);
        }
    }

    #[test]
    fn test_legal_transitions() {
        let mut record = admission("1", TriageLevel::Urgent, stamp(0, 0));

        record.transition(AdmissionState::InProgress).unwrap();
        record.transition(AdmissionState::Pending).unwrap();
        record.transition(AdmissionState::InProgress).unwrap();
        record.transition(AdmissionState::Finalized).unwrap();
        assert!(record.state().is_terminal());
    }

    #[test]
    fn test_illegal_transitions_leave_state_untouched() {
        let mut record = admission("1", TriageLevel::Urgent, stamp(0, 0));

        let err = record.transition(AdmissionState::Finalized).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: AdmissionState::Pending,
                to: AdmissionState::Finalized
            }
        ));
        assert!(record.transition(AdmissionState::Pending).is_err());
        assert_eq!(record.state(), AdmissionState::Pending);

        record.transition(AdmissionState::InProgress).unwrap();
        record.transition(AdmissionState::Finalized).unwrap();
        for to in [
            AdmissionState::Pending,
            AdmissionState::InProgress,
            AdmissionState::Finalized,
        ] {
            assert!(record.transition(to).is_err());
        }
    }

    #[test]
    fn test_transition_does_not_touch_attention() {
        let mut record = admission("1", TriageLevel::Urgent, stamp(0, 0));
        let before = record.attention().clone();

        record.transition(AdmissionState::InProgress).unwrap();
        assert_eq!(record.attention(), &before);
    }

    #[test]
    fn test_attention_appends_and_guards_physician() {
        let mut attention = AttentionRecord::new(NonEmptyText::new("fiebre").unwrap());
        let first = doctor("Dr. Paz");
        let second = doctor("Dra. Luna");

        assert!(attention.assign_physician_if_unset(&first));
        assert!(!attention.assign_physician_if_unset(&second));
        assert_eq!(attention.physician(), Some(&first));

        attention.append_physician_note(&NonEmptyText::new("neumonía").unwrap());
        assert!(attention.report().starts_with("fiebre"));
        assert!(attention.report().ends_with("neumonía"));
        assert!(attention.report().contains(PHYSICIAN_NOTE_SEPARATOR));
    }

    #[test]
    fn test_state_parses_from_str() {
        assert_eq!("in-progress".parse::<AdmissionState>().unwrap(), AdmissionState::InProgress);
        assert_eq!(AdmissionState::Finalized.to_string(), "FINALIZED");
        assert!("closed".parse::<AdmissionState>().is_err());
    }
}
