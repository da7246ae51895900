//! YAML file-backed stores.
//!
//! ## Storage layout
//!
//! ```text
//! <data_dir>/
//!   admissions/
//!     .queue.lock
//!     <s1>/<s2>/<admission-uuid>/admission.yaml
//!   patients/
//!     .patients.lock
//!     <national-id>.yaml
//! ```
//!
//! Admissions are sharded on the first four hex characters of their id. Each file is
//! replaced atomically: the record is written to a uniquely named sibling temp file, then
//! renamed over the target.
//!
//! Several processes (one per CLI invocation) may share a data directory, so mutual
//! exclusion uses an advisory lock file per store rather than an in-process lock. Reads
//! hold it shared; every write, including the whole check-then-act of
//! `compare_and_update`, holds it exclusive.

use super::{latest_matching, PatientStore, TriageQueueStore};
use crate::admission::{sort_by_priority, AdmissionId, AdmissionRecord, AdmissionState};
use crate::constants::{ADMISSION_FILENAME, PATIENTS_LOCK_FILENAME, QUEUE_LOCK_FILENAME};
use crate::patient::{NationalId, Patient};
use crate::{CoreError, CoreResult};
use fs2::FileExt;
use guardia_uuid::ShardableUuid;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

fn read_yaml<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let contents = fs::read_to_string(path).map_err(CoreError::FileRead)?;
    serde_yaml::from_str(&contents).map_err(CoreError::YamlDeserialization)
}

fn write_yaml_atomic<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let yaml = serde_yaml::to_string(value).map_err(CoreError::YamlSerialization)?;
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, yaml) {
        let _ = fs::remove_file(&tmp);
        return Err(CoreError::FileWrite(e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CoreError::FileWrite(e)
    })
}

/// `<name>.<uuid>.tmp` beside `path`, so concurrent writers never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{}.tmp", ShardableUuid::new()))
}

fn subdirs(path: &Path) -> impl Iterator<Item = PathBuf> {
    fs::read_dir(path)
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
}

/// Advisory lock file shared by every process that opens the same store directory.
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

/// Holds a lock on a [`LockFile`] until dropped.
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl LockFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn open(&self) -> CoreResult<File> {
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(CoreError::StoreLock)
    }

    fn shared(&self) -> CoreResult<LockGuard> {
        let file = self.open()?;
        FileExt::lock_shared(&file).map_err(CoreError::StoreLock)?;
        Ok(LockGuard(file))
    }

    fn exclusive(&self) -> CoreResult<LockGuard> {
        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(CoreError::StoreLock)?;
        Ok(LockGuard(file))
    }
}

// ============================================================================
// ADMISSIONS
// ============================================================================

#[derive(Debug)]
pub struct FileQueueStore {
    root: PathBuf,
    lock: LockFile,
}

impl FileQueueStore {
    /// Opens (creating if needed) an admissions store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `StorageDirCreation` if `root` cannot be created.
    pub fn open(root: PathBuf) -> CoreResult<Self> {
        fs::create_dir_all(&root).map_err(CoreError::StorageDirCreation)?;
        let lock = LockFile::new(root.join(QUEUE_LOCK_FILENAME));
        Ok(Self { root, lock })
    }

    fn record_path(&self, id: &AdmissionId) -> PathBuf {
        id.sharded_dir(&self.root).join(ADMISSION_FILENAME)
    }

    /// Reads every admission file. Unreadable files are logged and skipped.
    fn load_all(&self) -> Vec<AdmissionRecord> {
        let mut records = Vec::new();

        for s1 in subdirs(&self.root) {
            for s2 in subdirs(&s1) {
                for id_dir in subdirs(&s2) {
                    let path = id_dir.join(ADMISSION_FILENAME);
                    if !path.is_file() {
                        continue;
                    }
                    match read_yaml::<AdmissionRecord>(&path) {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            tracing::warn!("skipping unreadable admission {}: {}", path.display(), e)
                        }
                    }
                }
            }
        }

        tracing::debug!("loaded {} admissions from {}", records.len(), self.root.display());
        records
    }

    fn load_one(&self, id: &AdmissionId) -> CoreResult<Option<AdmissionRecord>> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        read_yaml(&path).map(Some)
    }

    fn write(&self, record: &AdmissionRecord) -> CoreResult<()> {
        let dir = record.id().sharded_dir(&self.root);
        fs::create_dir_all(&dir).map_err(CoreError::StorageDirCreation)?;
        write_yaml_atomic(&dir.join(ADMISSION_FILENAME), record)
    }
}

impl TriageQueueStore for FileQueueStore {
    /// Another process may have stamped an admission with its own clock since this one
    /// last looked, so the arrival is checked against every stored admission under the
    /// exclusive lock.
    fn insert(&self, record: AdmissionRecord) -> CoreResult<()> {
        let _guard = self.lock.exclusive()?;
        if self.record_path(record.id()).exists() {
            return Err(CoreError::InvalidOperation(format!(
                "admission {} already exists",
                record.id()
            )));
        }

        let latest = self.load_all().iter().map(AdmissionRecord::arrival).max();
        if let Some(latest) = latest.filter(|latest| record.arrival() <= *latest) {
            return Err(CoreError::ArrivalOutOfOrder { latest });
        }
        self.write(&record)
    }

    fn get_pending(&self) -> CoreResult<Vec<AdmissionRecord>> {
        let _guard = self.lock.shared()?;
        let mut pending: Vec<AdmissionRecord> = self
            .load_all()
            .into_iter()
            .filter(|r| r.state() == AdmissionState::Pending)
            .collect();
        sort_by_priority(&mut pending);
        Ok(pending)
    }

    /// Ordered by arrival, since directory order on disk is arbitrary.
    fn get_all(&self) -> CoreResult<Vec<AdmissionRecord>> {
        let _guard = self.lock.shared()?;
        let mut records = self.load_all();
        records.sort_by_key(AdmissionRecord::arrival);
        Ok(records)
    }

    fn find_by_id(&self, id: &AdmissionId) -> CoreResult<Option<AdmissionRecord>> {
        let _guard = self.lock.shared()?;
        self.load_one(id)
    }

    fn find_by_patient_and_state(
        &self,
        patient: &NationalId,
        state: AdmissionState,
    ) -> CoreResult<Option<AdmissionRecord>> {
        let _guard = self.lock.shared()?;
        Ok(latest_matching(self.load_all(), patient, state))
    }

    fn update(&self, record: &AdmissionRecord) -> CoreResult<()> {
        let _guard = self.lock.exclusive()?;
        if !self.record_path(record.id()).is_file() {
            return Err(CoreError::NotFound(format!("admission {}", record.id())));
        }
        self.write(record)
    }

    fn compare_and_update(
        &self,
        record: &AdmissionRecord,
        expected: AdmissionState,
    ) -> CoreResult<()> {
        let _guard = self.lock.exclusive()?;
        let current = self
            .load_one(record.id())?
            .ok_or_else(|| CoreError::NotFound(format!("admission {}", record.id())))?;

        if current.state() != expected {
            return Err(CoreError::StaleState {
                id: record.id().to_string(),
                expected,
                actual: current.state(),
            });
        }
        self.write(record)
    }
}

// ============================================================================
// PATIENTS
// ============================================================================

#[derive(Debug)]
pub struct FilePatientStore {
    dir: PathBuf,
    lock: LockFile,
}

impl FilePatientStore {
    pub fn open(dir: PathBuf) -> CoreResult<Self> {
        fs::create_dir_all(&dir).map_err(CoreError::StorageDirCreation)?;
        let lock = LockFile::new(dir.join(PATIENTS_LOCK_FILENAME));
        Ok(Self { dir, lock })
    }

    fn patient_path(&self, id: &NationalId) -> PathBuf {
        self.dir.join(format!("{}.yaml", id.as_str()))
    }
}

impl PatientStore for FilePatientStore {
    fn find_by_national_id(&self, id: &NationalId) -> CoreResult<Option<Patient>> {
        let _guard = self.lock.shared()?;
        let path = self.patient_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        read_yaml(&path).map(Some)
    }

    fn create(&self, patient: Patient) -> CoreResult<Patient> {
        let _guard = self.lock.exclusive()?;
        let path = self.patient_path(&patient.national_id);
        if path.is_file() {
            return read_yaml(&path);
        }
        write_yaml_atomic(&path, &patient)?;
        Ok(patient)
    }

    fn list(&self) -> CoreResult<Vec<Patient>> {
        let _guard = self.lock.shared()?;
        let mut patients = Vec::new();

        for entry in fs::read_dir(&self.dir).map_err(CoreError::FileRead)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match read_yaml::<Patient>(&path) {
                Ok(patient) => patients.push(patient),
                Err(e) => tracing::warn!("skipping unreadable patient {}: {}", path.display(), e),
            }
        }

        patients.sort_by(|a, b| a.national_id.cmp(&b.national_id));
        Ok(patients)
    }
}
