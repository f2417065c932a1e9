//! Farm submission of Maya jobs and their dailies.

mod error;
pub mod payload;
mod runner;

pub use error::SubmitError;
pub use payload::{build_daily_payload, build_layer_payload};
pub use runner::{
    apply_status, preview_job, submit_daily, submit_job, DailyOutcome, SubmissionPreview,
    SubmissionReport, SubmitSettings,
};
