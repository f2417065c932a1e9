//! Client for the Deadline Web Service REST API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use super::{FarmClient, FarmError, JobInfo, PluginInfo, Result};
use crate::config::FarmConfig;
use crate::sanitize::redact_url;
use crate::secrets;

pub struct DeadlineClient {
    client: Client,
    base: String,
    user_name: Option<String>,
    password: Option<SecretString>,
}

impl DeadlineClient {
    pub fn new(config: &FarmConfig) -> Result<Self> {
        let password = secrets::resolve_secret_optional(
            config.password.as_deref(),
            config.password_file.as_deref(),
            config.password_env.as_deref(),
        )?;
        let client = Client::builder()
            .user_agent(concat!("renderdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(url = %redact_url(&config.url), "Deadline client ready");

        Ok(Self {
            client,
            base: config.url.trim_end_matches('/').to_string(),
            user_name: config.user_name.clone(),
            password,
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}/api/jobs", self.base)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.user_name {
            Some(user) => req.basic_auth(
                user,
                self.password.as_ref().map(|p| p.expose_secret().to_string()),
            ),
            None => req,
        }
    }

    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FarmError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

/// Request body for `POST /api/jobs`.
pub(crate) fn submission_body(job_info: &JobInfo, plugin_info: &PluginInfo) -> Value {
    json!({
        "JobInfo": job_info,
        "PluginInfo": plugin_info,
        "AuxFiles": [],
        "IdOnly": true,
    })
}

pub(crate) fn parse_job_id(body: &Value) -> Result<String> {
    body.get("_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FarmError::InvalidResponse(format!("missing _id in {}", body)))
}

/// The job query answers with an array of jobs; an empty array or a
/// non-array body means the id is unknown.
pub(crate) fn parse_exists(body: &Value) -> bool {
    body.as_array().is_some_and(|jobs| !jobs.is_empty())
}

impl FarmClient for DeadlineClient {
    fn submit_job(&self, job_info: &JobInfo, plugin_info: &PluginInfo) -> Result<String> {
        let req = self
            .client
            .post(self.jobs_url())
            .json(&submission_body(job_info, plugin_info));
        let resp = Self::check(self.authorize(req).send()?)?;
        let body: Value = resp.json()?;
        let id = parse_job_id(&body)?;
        tracing::info!(job_id = %id, "Submitted farm job");
        Ok(id)
    }

    fn job_exists(&self, job_id: &str) -> Result<bool> {
        let req = self.client.get(self.jobs_url()).query(&[("JobID", job_id)]);
        let resp = self.authorize(req).send()?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let body: Value = Self::check(resp)?.json()?;
        Ok(parse_exists(&body))
    }

    fn requeue_job(&self, job_id: &str) -> Result<()> {
        let req = self
            .client
            .put(self.jobs_url())
            .json(&json!({ "Command": "requeue", "JobID": job_id }));
        Self::check(self.authorize(req).send()?)?;
        tracing::info!(job_id, "Requeued farm job");
        Ok(())
    }
}
