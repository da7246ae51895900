//! Staff identities recorded on admissions.
//!
//! Nurses and physicians reach the core already authenticated; the core only records who
//! did what. Both carry the same data (a name and a professional licence number) but are
//! kept as distinct types so a nurse can never be passed where a physician is expected.

use crate::{CoreError, CoreResult, NonEmptyText};
use guardia_types::{TextError, Token};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A member of clinical staff: full name plus licence (matrícula) number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clinician {
    pub name: NonEmptyText,
    pub license: Token,
}

impl Clinician {
    /// Builds a clinician from raw name and licence input, trimming both.
    ///
    /// # Errors
    ///
    /// - `Validation("clinician name is mandatory")` if `name` is blank.
    /// - `Validation("license number is mandatory")` if `license` is blank.
    /// - `Validation("invalid license number")` if `license` contains whitespace.
    pub fn new(name: impl AsRef<str>, license: impl AsRef<str>) -> CoreResult<Self> {
        let name = NonEmptyText::new(name)
            .map_err(|_| CoreError::Validation("clinician name is mandatory".into()))?;
        let license = Token::new(license).map_err(|e| match e {
            TextError::Empty => CoreError::Validation("license number is mandatory".into()),
            TextError::ContainsWhitespace => {
                CoreError::Validation("invalid license number".into())
            }
        })?;
        Ok(Self { name, license })
    }
}

impl fmt::Display for Clinician {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.license)
    }
}

/// The triage nurse who registered an admission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nurse(Clinician);

/// A physician who claims and attends admissions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doctor(Clinician);

macro_rules! staff_role {
    ($ty:ident) => {
        impl $ty {
            /// See [`Clinician::new`] for validation.
            pub fn new(name: impl AsRef<str>, license: impl AsRef<str>) -> CoreResult<Self> {
                Clinician::new(name, license).map(Self)
            }

            pub fn clinician(&self) -> &Clinician {
                &self.0
            }

            pub fn name(&self) -> &str {
                self.0.name.as_str()
            }

            pub fn license(&self) -> &str {
                self.0.license.as_str()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

staff_role!(Nurse);
staff_role!(Doctor);
