//! Workflow services.
//!
//! [`AdmissionService`] registers urgencies and moves admissions between PENDING and
//! IN_PROGRESS; [`AttentionService`] closes them out with the physician's report. Both are
//! cheap to clone and hold no mutable state of their own: everything shared lives behind
//! the store traits in [`crate::repositories`].

mod admission;
mod attention;

pub use admission::{AdmissionService, UrgencyRequest};
pub use attention::AttentionService;

use crate::repositories::TriageQueueStore;
use crate::CoreResult;
use guardia_uuid::ArrivalClock;

pub(crate) const NO_PATIENTS_WAITING: &str = "no patients waiting";
pub(crate) const NO_IN_PROGRESS_ADMISSION: &str = "no in-progress admission found for patient";
pub(crate) const ONLY_IN_PROGRESS_ATTENDED: &str = "only in-progress admissions may be attended";
pub(crate) const PHYSICIAN_REQUIRED: &str = "physician is required";

/// Builds an arrival clock that continues after the latest admission already in `queue`,
/// so restarting against a persistent store never issues an earlier stamp.
pub fn arrival_clock_for(queue: &dyn TriageQueueStore) -> CoreResult<ArrivalClock> {
    Ok(ArrivalClock::resume_after(queue.latest_arrival()?))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{locality_from_env_value, CoreConfig, StoreKind};
    use crate::identity::Nurse;
    use crate::patient::PatientDemographics;
    use crate::repositories::Stores;
    use crate::triage::TriageLevel;
    use crate::vitals::VitalReadings;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    pub struct Harness {
        pub stores: Stores,
        pub admissions: AdmissionService,
        pub attention: AttentionService,
    }

    pub fn harness() -> Harness {
        let cfg = Arc::new(CoreConfig::new(
            PathBuf::from("unused"),
            StoreKind::Memory,
            locality_from_env_value(Some("San Miguel de Tucumán".into())),
        ));
        let stores = Stores::from_config(&cfg).unwrap();
        let clock = Arc::new(arrival_clock_for(stores.queue.as_ref()).unwrap());
        Harness {
            admissions: AdmissionService::new(cfg, &stores, clock),
            attention: AttentionService::new(&stores),
            stores,
        }
    }

    /// An admission service over its own file stores in `data_dir`, the way each CLI
    /// process builds one. Without `clock` it resumes from what is already stored.
    pub fn file_admissions(data_dir: &Path, clock: Option<ArrivalClock>) -> AdmissionService {
        let cfg = Arc::new(CoreConfig::new(
            data_dir.to_path_buf(),
            StoreKind::File,
            locality_from_env_value(None),
        ));
        let stores = Stores::from_config(&cfg).unwrap();
        let clock = match clock {
            Some(clock) => clock,
            None => arrival_clock_for(stores.queue.as_ref()).unwrap(),
        };
        AdmissionService::new(cfg, &stores, Arc::new(clock))
    }

    pub fn readings() -> VitalReadings {
        VitalReadings {
            temperature: 38.1,
            heart_rate: 104.0,
            respiratory_rate: 22.0,
            systolic_pressure: 140.0,
            diastolic_pressure: 90.0,
        }
    }

    pub fn urgency(patient_id: &str, level: TriageLevel) -> UrgencyRequest {
        UrgencyRequest {
            patient_id: patient_id.to_string(),
            nurse: Nurse::new("Marta Ruiz", "MN-908").unwrap(),
            note: format!("ingresa paciente {patient_id}"),
            triage_level: level,
            vitals: readings(),
            demographics: PatientDemographics::default(),
        }
    }
}
