//! Render farm access.
//!
//! Everything that talks to the farm goes through [`FarmClient`]. The client
//! is built once at start-up and passed by reference to the operations that
//! need it.

use std::collections::BTreeMap;

use thiserror::Error;

pub mod deadline;
pub mod dry_run;

pub use deadline::DeadlineClient;
pub use dry_run::{DryRunFarm, RecordedSubmission};

/// Job-level submission keys (`BatchName`, `Frames`, `Priority`, ...).
pub type JobInfo = BTreeMap<String, String>;

/// Plugin-level submission keys (`SceneFile`, `RenderLayer`, ...).
pub type PluginInfo = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Farm returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Unexpected farm response: {0}")]
    InvalidResponse(String),

    #[error("Farm credentials: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

pub type Result<T> = std::result::Result<T, FarmError>;

/// Operations the render farm provides.
pub trait FarmClient {
    /// Submits a job and returns the farm's id for it.
    fn submit_job(&self, job_info: &JobInfo, plugin_info: &PluginInfo) -> Result<String>;

    /// Whether the farm still knows a job with this id.
    fn job_exists(&self, job_id: &str) -> Result<bool>;

    /// Puts an existing job back in the queue.
    fn requeue_job(&self, job_id: &str) -> Result<()>;
}

impl<T: FarmClient + ?Sized> FarmClient for &T {
    fn submit_job(&self, job_info: &JobInfo, plugin_info: &PluginInfo) -> Result<String> {
        (**self).submit_job(job_info, plugin_info)
    }

    fn job_exists(&self, job_id: &str) -> Result<bool> {
        (**self).job_exists(job_id)
    }

    fn requeue_job(&self, job_id: &str) -> Result<()> {
        (**self).requeue_job(job_id)
    }
}
