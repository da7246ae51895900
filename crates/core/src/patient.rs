//! Patient references used by the admission workflow.
//!
//! Only the slice of demographics the emergency queue needs lives here. When a patient
//! arrives who is not yet on file, a placeholder record is synthesised from whatever the
//! nurse could collect, with sentinel values for the rest, so admission never blocks on
//! missing paperwork.

use crate::constants::{PLACEHOLDER_ADDRESS_NUMBER, UNREGISTERED};
use crate::{CoreError, CoreResult, NonEmptyText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised national identity number (CUIL-equivalent).
///
/// Normalisation strips spaces, dots and hyphens, so `20-30123456-3` and `20301234563`
/// address the same patient. Checksum validation is left to the API boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let normalised: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
            .collect();

        if normalised.is_empty() {
            return Err(CoreError::Validation("national id is mandatory".into()));
        }
        if !normalised.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::Validation(
                "national id must contain only digits".into(),
            ));
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NationalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NationalId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: NonEmptyText,
    pub number: u32,
    pub locality: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub national_id: NationalId,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: Address,
    /// False for placeholder records created at admission time with incomplete data.
    pub registered: bool,
    pub created_at: DateTime<Utc>,
}

/// Optional demographic fields a nurse may supply for a patient not yet on file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDemographics {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub locality: Option<String>,
}

fn or_sentinel(value: Option<&str>, sentinel: &NonEmptyText) -> NonEmptyText {
    value
        .and_then(|v| NonEmptyText::new(v).ok())
        .unwrap_or_else(|| sentinel.clone())
}

impl Patient {
    /// Builds a placeholder patient, filling blank or missing fields with sentinels.
    ///
    /// The record counts as `registered` only when both names were supplied.
    pub fn placeholder(
        national_id: NationalId,
        demographics: &PatientDemographics,
        default_locality: &NonEmptyText,
        created_at: DateTime<Utc>,
    ) -> Self {
        let unregistered = crate::config::unregistered_text();
        let first_name = or_sentinel(demographics.first_name.as_deref(), &unregistered);
        let last_name = or_sentinel(demographics.last_name.as_deref(), &unregistered);
        let registered = first_name.as_str() != UNREGISTERED && last_name.as_str() != UNREGISTERED;

        Self {
            national_id,
            first_name,
            last_name,
            email: demographics
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_owned),
            address: Address {
                street: or_sentinel(demographics.street.as_deref(), &unregistered),
                number: demographics.number.unwrap_or(PLACEHOLDER_ADDRESS_NUMBER),
                locality: or_sentinel(demographics.locality.as_deref(), default_locality),
            },
            registered,
            created_at,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locality() -> NonEmptyText {
        NonEmptyText::new("San Miguel de Tucumán").unwrap()
    }

    #[test]
    fn test_national_id_normalises_separators() {
        let id = NationalId::parse(" 20-30123456.3 ").unwrap();
        assert_eq!(id.as_str(), "20301234563");
    }

    #[test]
    fn test_national_id_rejects_letters_and_blank() {
        assert!(matches!(
            NationalId::parse("20A30123456"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(NationalId::parse(" - "), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_placeholder_without_demographics_uses_sentinels() {
        let id = NationalId::parse("20301234563").unwrap();
        let patient = Patient::placeholder(id, &PatientDemographics::default(), &locality(), Utc::now());

        assert_eq!(patient.first_name.as_str(), UNREGISTERED);
        assert_eq!(patient.last_name.as_str(), UNREGISTERED);
        assert_eq!(patient.address.street.as_str(), UNREGISTERED);
        assert_eq!(patient.address.number, PLACEHOLDER_ADDRESS_NUMBER);
        assert_eq!(patient.address.locality, locality());
        assert!(patient.email.is_none());
        assert!(!patient.registered);
    }

    #[test]
    fn test_placeholder_prefers_supplied_fields() {
        let id = NationalId::parse("27111222333").unwrap();
        let demographics = PatientDemographics {
            first_name: Some("Lucía".into()),
            last_name: Some("Paz".into()),
            email: Some("  ".into()),
            street: Some("Av. Mate de Luna".into()),
            number: Some(1500),
            locality: None,
        };

        let patient = Patient::placeholder(id, &demographics, &locality(), Utc::now());

        assert_eq!(patient.full_name(), "Lucía Paz");
        assert_eq!(patient.address.street.as_str(), "Av. Mate de Luna");
        assert_eq!(patient.address.number, 1500);
        assert_eq!(patient.address.locality, locality());
        assert!(patient.email.is_none());
        assert!(patient.registered);
    }
}
