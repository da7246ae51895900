//! Vital-sign value types.
//!
//! Each vital is an immutable wrapper around a non-negative, finite magnitude. Values are
//! built once, when the nurse's readings are turned into an admission, and never mutated.
//! Zero is accepted: it is a legitimate (if alarming) reading.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

macro_rules! vital_sign {
    ($(#[$meta:meta])* $name:ident, $label:literal, $unit:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Human-readable name used in validation messages.
            pub const LABEL: &'static str = $label;
            pub const UNIT: &'static str = $unit;

            pub fn new(value: f64) -> CoreResult<Self> {
                if !value.is_finite() {
                    return Err(CoreError::Validation(format!(
                        "{} must be a finite number",
                        Self::LABEL
                    )));
                }
                if value < 0.0 {
                    return Err(CoreError::Validation(format!(
                        "{} cannot be negative",
                        Self::LABEL
                    )));
                }
                Ok(Self(value))
            }

            pub fn value(&self) -> f64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", self.0, Self::UNIT)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = f64::deserialize(deserializer)?;
                $name::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

vital_sign!(
    /// Body temperature.
    Temperature,
    "temperature",
    "°C"
);
vital_sign!(
    /// Heart rate.
    HeartRate,
    "heart rate",
    "bpm"
);
vital_sign!(
    /// Respiratory rate.
    RespiratoryRate,
    "respiratory rate",
    "rpm"
);
vital_sign!(SystolicPressure, "systolic pressure", "mmHg");
vital_sign!(DiastolicPressure, "diastolic pressure", "mmHg");

/// Systolic over diastolic arterial pressure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: SystolicPressure,
    pub diastolic: DiastolicPressure,
}

impl std::fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} mmHg",
            self.systolic.value(),
            self.diastolic.value()
        )
    }
}

/// Raw, unvalidated readings as typed in by the triage nurse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalReadings {
    pub temperature: f64,
    pub heart_rate: f64,
    pub respiratory_rate: f64,
    pub systolic_pressure: f64,
    pub diastolic_pressure: f64,
}

/// Validated vitals recorded on an admission.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub temperature: Temperature,
    pub heart_rate: HeartRate,
    pub respiratory_rate: RespiratoryRate,
    pub blood_pressure: BloodPressure,
}

impl VitalSigns {
    /// Validates every reading, failing on the first offending vital in the order
    /// temperature, heart rate, respiratory rate, systolic, diastolic.
    pub fn from_readings(readings: &VitalReadings) -> CoreResult<Self> {
        Ok(Self {
            temperature: Temperature::new(readings.temperature)?,
            heart_rate: HeartRate::new(readings.heart_rate)?,
            respiratory_rate: RespiratoryRate::new(readings.respiratory_rate)?,
            blood_pressure: BloodPressure {
                systolic: SystolicPressure::new(readings.systolic_pressure)?,
                diastolic: DiastolicPressure::new(readings.diastolic_pressure)?,
            },
        })
    }
}

impl TryFrom<VitalReadings> for VitalSigns {
    type Error = CoreError;

    fn try_from(readings: VitalReadings) -> Result<Self, Self::Error> {
        VitalSigns::from_readings(&readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_readings() -> VitalReadings {
        VitalReadings {
            temperature: 36.8,
            heart_rate: 72.0,
            respiratory_rate: 16.0,
            systolic_pressure: 120.0,
            diastolic_pressure: 80.0,
        }
    }

    fn validation_message(err: CoreError) -> String {
        match err {
            CoreError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_is_accepted_for_every_vital() {
        assert_eq!(Temperature::new(0.0).unwrap().value(), 0.0);
        assert_eq!(HeartRate::new(0.0).unwrap().value(), 0.0);
        assert_eq!(RespiratoryRate::new(0.0).unwrap().value(), 0.0);
        assert_eq!(SystolicPressure::new(0.0).unwrap().value(), 0.0);
        assert_eq!(DiastolicPressure::new(0.0).unwrap().value(), 0.0);
    }

    #[test]
    fn test_negative_values_name_the_vital() {
        let cases: [(CoreResult<()>, &str); 5] = [
            (Temperature::new(-0.1).map(drop), "temperature cannot be negative"),
            (HeartRate::new(-1.0).map(drop), "heart rate cannot be negative"),
            (RespiratoryRate::new(-1.0).map(drop), "respiratory rate cannot be negative"),
            (SystolicPressure::new(-5.0).map(drop), "systolic pressure cannot be negative"),
            (DiastolicPressure::new(-5.0).map(drop), "diastolic pressure cannot be negative"),
        ];

        for (result, expected) in cases {
            assert_eq!(validation_message(result.unwrap_err()), expected);
        }
    }

    #[test]
    fn test_display_appends_unit() {
        assert_eq!(HeartRate::new(72.0).unwrap().to_string(), "72 bpm");
        assert_eq!(
            SystolicPressure::new(120.5).unwrap().to_string(),
            format!("120.5 {}", SystolicPressure::UNIT)
        );
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let err = HeartRate::new(f64::NAN).unwrap_err();
        assert_eq!(validation_message(err), "heart rate must be a finite number");
        assert!(Temperature::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_from_readings_reports_first_offending_vital() {
        let mut readings = normal_readings();
        readings.respiratory_rate = -2.0;
        readings.diastolic_pressure = -3.0;

        let err = VitalSigns::from_readings(&readings).unwrap_err();
        assert_eq!(validation_message(err), "respiratory rate cannot be negative");
    }

    #[test]
    fn test_from_readings_keeps_values() {
        let vitals = VitalSigns::try_from(normal_readings()).unwrap();
        assert_eq!(vitals.heart_rate.value(), 72.0);
        assert_eq!(vitals.blood_pressure.to_string(), "120/80 mmHg");
    }

    #[test]
    fn test_deserialise_rejects_negative_magnitude() {
        let err = serde_json::from_str::<HeartRate>("-4.0").unwrap_err();
        assert!(err.to_string().contains("heart rate cannot be negative"));
    }
}
