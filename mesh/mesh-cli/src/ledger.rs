//! Job bookkeeping for the calling layer.
//!
//! The ledger is owned by `main` and lent out by `&mut`; the pipeline
//! itself never sees it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// A fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a job is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Input accepted, not started.
    Uploaded,
    /// Pipeline running.
    Processing,
    /// Output written.
    Optimized,
    /// Load or export failed.
    Failed,
}

impl JobStatus {
    /// No further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Optimized | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Optimized => "optimized",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// File name as given by the user.
    pub original_name: String,
    /// Where the input is read from.
    pub input_path: PathBuf,
    /// Input size in bytes.
    pub size: u64,
    /// Current state.
    pub status: JobStatus,
    /// Set once the output is written.
    pub output_path: Option<PathBuf>,
    /// Set when the job failed.
    pub error: Option<String>,
}

/// All jobs of one invocation, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobLedger {
    jobs: BTreeMap<JobId, JobRecord>,
}

impl JobLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted input.
    pub fn register(&mut self, input_path: &Path, size: u64) -> JobId {
        let id = JobId::new();
        let original_name = input_path
            .file_name()
            .map_or_else(|| input_path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.jobs.insert(
            id,
            JobRecord {
                original_name,
                input_path: input_path.to_path_buf(),
                size,
                status: JobStatus::Uploaded,
                output_path: None,
                error: None,
            },
        );
        id
    }

    /// Look up a job.
    #[must_use]
    pub fn get(&self, id: JobId) -> Option<&JobRecord> {
        self.jobs.get(&id)
    }

    /// Mark a job as running.
    pub fn start(&mut self, id: JobId) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Processing;
        }
    }

    /// Mark a job as done.
    pub fn complete(&mut self, id: JobId, output_path: PathBuf) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Optimized;
            job.output_path = Some(output_path);
        }
    }

    /// Mark a job as failed.
    pub fn fail(&mut self, id: JobId, error: impl fmt::Display) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Failed;
            job.error = Some(error.to_string());
        }
    }

    /// Number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs with the given status.
    #[must_use]
    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.values().filter(|j| j.status == status).count()
    }

    /// Pretty JSON dump of every job.
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
