//! Constants used throughout the guardia core crate.

/// Default directory for file-backed storage when none is configured.
pub const DEFAULT_DATA_DIR: &str = "guardia_data";

/// Directory name for admission records under the data directory.
pub const ADMISSIONS_DIR_NAME: &str = "admissions";

/// Directory name for patient records under the data directory.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Filename for a single persisted admission.
pub const ADMISSION_FILENAME: &str = "admission.yaml";

/// Advisory lock files, one per store directory.
pub const QUEUE_LOCK_FILENAME: &str = ".queue.lock";
pub const PATIENTS_LOCK_FILENAME: &str = ".patients.lock";

/// Sentinel used for any demographic text field missing from a placeholder patient.
pub const UNREGISTERED: &str = "Unregistered";

/// Street number recorded for placeholder patients.
pub const PLACEHOLDER_ADDRESS_NUMBER: u32 = 999;

/// Marker inserted between the nurse's triage note and the physician's report.
pub const PHYSICIAN_NOTE_SEPARATOR: &str = "\n--- physician report ---\n";
