//! Request and response bodies.
//!
//! DTOs are deliberately flat and stringly typed at the edges (triage level, timestamps)
//! so the OpenAPI schema stays readable; conversion into core types performs all
//! validation and surfaces failures as `CoreError`.

use guardia_core::{
    AdmissionRecord, AttentionRecord, Clinician, CoreResult, Doctor, Nurse, Patient,
    PatientDemographics, TriageLevel, UrgencyRequest, VitalReadings,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Name and licence number of an authenticated staff member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClinicianDto {
    pub name: String,
    pub license: String,
}

impl ClinicianDto {
    pub fn into_nurse(self) -> CoreResult<Nurse> {
        Nurse::new(self.name, self.license)
    }

    pub fn into_doctor(self) -> CoreResult<Doctor> {
        Doctor::new(self.name, self.license)
    }
}

impl From<&Clinician> for ClinicianDto {
    fn from(c: &Clinician) -> Self {
        Self {
            name: c.name.to_string(),
            license: c.license.to_string(),
        }
    }
}

/// Converts an optional physician body into the optional core identity, keeping `None`
/// as `None` so the service reports the missing argument itself.
pub fn optional_doctor(dto: Option<ClinicianDto>) -> CoreResult<Option<Doctor>> {
    dto.map(ClinicianDto::into_doctor).transpose()
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VitalsDto {
    pub temperature: f64,
    pub heart_rate: f64,
    pub respiratory_rate: f64,
    pub systolic_pressure: f64,
    pub diastolic_pressure: f64,
}

impl From<VitalsDto> for VitalReadings {
    fn from(v: VitalsDto) -> Self {
        VitalReadings {
            temperature: v.temperature,
            heart_rate: v.heart_rate,
            respiratory_rate: v.respiratory_rate,
            systolic_pressure: v.systolic_pressure,
            diastolic_pressure: v.diastolic_pressure,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DemographicsDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<u32>,
    pub locality: Option<String>,
}

impl From<DemographicsDto> for PatientDemographics {
    fn from(d: DemographicsDto) -> Self {
        PatientDemographics {
            first_name: d.first_name,
            last_name: d.last_name,
            email: d.email,
            street: d.street,
            number: d.number,
            locality: d.locality,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterUrgencyReq {
    pub patient_id: String,
    pub nurse: ClinicianDto,
    pub note: String,
    /// One of CRITICAL, EMERGENCY, URGENT, MINOR_URGENT, NON_URGENT.
    pub triage_level: String,
    pub vitals: VitalsDto,
    #[serde(default)]
    pub demographics: Option<DemographicsDto>,
}

impl RegisterUrgencyReq {
    pub fn into_request(self) -> CoreResult<UrgencyRequest> {
        Ok(UrgencyRequest {
            patient_id: self.patient_id,
            nurse: self.nurse.into_nurse()?,
            note: self.note,
            triage_level: self.triage_level.parse::<TriageLevel>()?,
            vitals: self.vitals.into(),
            demographics: self.demographics.unwrap_or_default().into(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ClaimReq {
    #[serde(default)]
    pub physician: Option<ClinicianDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AttentionReq {
    pub note: String,
    #[serde(default)]
    pub physician: Option<ClinicianDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AttentionRes {
    pub report: String,
    pub physician: Option<ClinicianDto>,
}

impl From<&AttentionRecord> for AttentionRes {
    fn from(a: &AttentionRecord) -> Self {
        Self {
            report: a.report().to_string(),
            physician: a.physician().map(|d| ClinicianDto::from(d.clinician())),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionRes {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub nurse: ClinicianDto,
    pub triage_level: String,
    pub state: String,
    /// RFC 3339 arrival timestamp.
    pub arrived_at: String,
    pub vitals: VitalsDto,
    pub attention: AttentionRes,
}

impl From<&AdmissionRecord> for AdmissionRes {
    fn from(r: &AdmissionRecord) -> Self {
        let vitals = r.vitals();
        Self {
            id: r.id().to_string(),
            patient_id: r.patient_id().to_string(),
            patient_name: r.patient().full_name(),
            nurse: ClinicianDto::from(r.nurse().clinician()),
            triage_level: r.triage_level().to_string(),
            state: r.state().to_string(),
            arrived_at: r.arrived_at().to_rfc3339(),
            vitals: VitalsDto {
                temperature: vitals.temperature.value(),
                heart_rate: vitals.heart_rate.value(),
                respiratory_rate: vitals.respiratory_rate.value(),
                systolic_pressure: vitals.blood_pressure.systolic.value(),
                diastolic_pressure: vitals.blood_pressure.diastolic.value(),
            },
            attention: AttentionRes::from(r.attention()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAdmissionsRes {
    pub admissions: Vec<AdmissionRes>,
}

impl ListAdmissionsRes {
    pub fn from_records(records: &[AdmissionRecord]) -> Self {
        Self {
            admissions: records.iter().map(AdmissionRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub street: String,
    pub number: u32,
    pub locality: String,
    pub registered: bool,
    pub created_at: String,
}

impl From<&Patient> for PatientRes {
    fn from(p: &Patient) -> Self {
        Self {
            national_id: p.national_id.to_string(),
            first_name: p.first_name.to_string(),
            last_name: p.last_name.to_string(),
            email: p.email.clone(),
            street: p.address.street.to_string(),
            number: p.address.number,
            locality: p.address.locality.to_string(),
            registered: p.registered,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardia_core::CoreError;

    fn register_req(level: &str) -> RegisterUrgencyReq {
        RegisterUrgencyReq {
            patient_id: "20301234563".into(),
            nurse: ClinicianDto {
                name: "Marta Ruiz".into(),
                license: "MN-908".into(),
            },
            note: "disnea".into(),
            triage_level: level.into(),
            vitals: VitalsDto {
                temperature: 36.5,
                heart_rate: 80.0,
                respiratory_rate: 16.0,
                systolic_pressure: 120.0,
                diastolic_pressure: 80.0,
            },
            demographics: None,
        }
    }

    #[test]
    fn test_register_req_parses_triage_level() {
        let request = register_req("minor_urgent").into_request().unwrap();
        assert_eq!(request.triage_level, TriageLevel::MinorUrgent);
        assert_eq!(request.nurse.name(), "Marta Ruiz");
        assert_eq!(request.demographics, PatientDemographics::default());
    }

    #[test]
    fn test_register_req_rejects_unknown_level() {
        let err = register_req("purple").into_request().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_optional_doctor_keeps_absence() {
        assert!(optional_doctor(None).unwrap().is_none());
        let doctor = optional_doctor(Some(ClinicianDto {
            name: "Dr. Paz".into(),
            license: "MP-1".into(),
        }))
        .unwrap();
        assert_eq!(doctor.unwrap().license(), "MP-1");
    }

    #[test]
    fn test_claim_req_physician_defaults_to_none() {
        let req: ClaimReq = serde_json::from_str("{}").unwrap();
        assert!(req.physician.is_none());
    }
}
