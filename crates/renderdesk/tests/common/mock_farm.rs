//! Scriptable farm double.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use renderdesk::farm::{FarmClient, FarmError, JobInfo, PluginInfo, Result};

#[derive(Default)]
pub struct MockFarm {
    /// Job names (`JobInfo["Name"]`) the farm rejects.
    failing: HashSet<String>,
    submitted: Mutex<Vec<JobInfo>>,
    known: Mutex<HashSet<String>>,
    requeued: Mutex<Vec<String>>,
}

impl MockFarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects submissions whose job name is `name`.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Marks a job id as present on the farm.
    pub fn knows(self, id: &str) -> Self {
        self.known.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<JobInfo> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submitted()
            .iter()
            .map(|info| info.get("Name").cloned().unwrap_or_default())
            .collect()
    }

    pub fn requeued(&self) -> Vec<String> {
        self.requeued.lock().unwrap().clone()
    }
}

impl FarmClient for MockFarm {
    fn submit_job(&self, job_info: &JobInfo, _plugin_info: &PluginInfo) -> Result<String> {
        let name = job_info.get("Name").cloned().unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(FarmError::Status {
                code: 500,
                body: format!("rejected {}", name),
            });
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(job_info.clone());
        let id = format!("job-{}", submitted.len());
        self.known.lock().unwrap().insert(id.clone());
        Ok(id)
    }

    fn job_exists(&self, job_id: &str) -> Result<bool> {
        Ok(self.known.lock().unwrap().contains(job_id))
    }

    fn requeue_job(&self, job_id: &str) -> Result<()> {
        self.requeued.lock().unwrap().push(job_id.to_string());
        Ok(())
    }
}
