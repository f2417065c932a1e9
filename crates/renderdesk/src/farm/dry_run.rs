use std::sync::Mutex;

use super::{FarmClient, JobInfo, PluginInfo, Result};

/// A submission captured by [`DryRunFarm`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSubmission {
    pub id: String,
    pub job_info: JobInfo,
    pub plugin_info: PluginInfo,
}

/// A farm that accepts everything and renders nothing. Submissions get
/// sequential `dry-run-<n>` ids and are kept for inspection.
#[derive(Debug, Default)]
pub struct DryRunFarm {
    submissions: Mutex<Vec<RecordedSubmission>>,
    requeued: Mutex<Vec<String>>,
}

impl DryRunFarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn requeued(&self) -> Vec<String> {
        self.requeued.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl FarmClient for DryRunFarm {
    fn submit_job(&self, job_info: &JobInfo, plugin_info: &PluginInfo) -> Result<String> {
        let mut submissions = self
            .submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = format!("dry-run-{}", submissions.len() + 1);
        tracing::info!(
            job_id = %id,
            name = job_info.get("Name").map(String::as_str).unwrap_or_default(),
            "Dry run: job not sent to the farm"
        );
        submissions.push(RecordedSubmission {
            id: id.clone(),
            job_info: job_info.clone(),
            plugin_info: plugin_info.clone(),
        });
        Ok(id)
    }

    fn job_exists(&self, job_id: &str) -> Result<bool> {
        Ok(self.submissions().iter().any(|s| s.id == job_id))
    }

    fn requeue_job(&self, job_id: &str) -> Result<()> {
        self.requeued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(job_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_numbers_submissions() {
        let farm = DryRunFarm::new();
        let mut job = JobInfo::new();
        job.insert("Name".to_string(), "sc_010 - BEAUTY".to_string());

        assert_eq!(farm.submit_job(&job, &PluginInfo::new()).unwrap(), "dry-run-1");
        assert_eq!(farm.submit_job(&job, &PluginInfo::new()).unwrap(), "dry-run-2");
        assert_eq!(farm.submissions().len(), 2);
        assert!(farm.job_exists("dry-run-2").unwrap());
        assert!(!farm.job_exists("dry-run-3").unwrap());

        farm.requeue_job("dry-run-1").unwrap();
        assert_eq!(farm.requeued(), vec!["dry-run-1"]);
    }
}
