use crate::admission::AdmissionState;
use guardia_uuid::ArrivalStamp;

/// Broad classification of a [`CoreError`], used by API layers to pick a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing mandatory input; caller-fixable.
    Validation,
    /// A required argument was not supplied.
    NullArgument,
    /// Well-formed request that is illegal in the current state; may succeed later.
    InvalidOperation,
    NotFound,
    /// Storage or other infrastructure failure.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NullArgument(String),
    #[error("{0}")]
    InvalidOperation(String),
    #[error("illegal admission transition from {from} to {to}")]
    InvalidTransition {
        from: AdmissionState,
        to: AdmissionState,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("admission {id} is {actual}, expected {expected}")]
    StaleState {
        id: String,
        expected: AdmissionState,
        actual: AdmissionState,
    },

    /// Another process stored a later arrival first. Services re-stamp and retry.
    #[error("arrival precedes stored admission at {latest:?}")]
    ArrivalOutOfOrder { latest: ArrivalStamp },

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to lock store: {0}")]
    StoreLock(std::io::Error),
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::NullArgument(_) => ErrorKind::NullArgument,
            CoreError::InvalidOperation(_)
            | CoreError::InvalidTransition { .. }
            | CoreError::StaleState { .. } => ErrorKind::InvalidOperation,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::StorageDirCreation(_)
            | CoreError::FileRead(_)
            | CoreError::FileWrite(_)
            | CoreError::YamlSerialization(_)
            | CoreError::YamlDeserialization(_)
            | CoreError::ArrivalOutOfOrder { .. }
            | CoreError::StoreLock(_)
            | CoreError::LockPoisoned => ErrorKind::Internal,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CoreError::LockPoisoned
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
