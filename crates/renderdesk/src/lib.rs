pub mod config;
pub mod daily;
pub mod db;
pub mod error;
pub mod farm;
pub mod frames;
pub mod model;
pub mod sanitize;
pub mod secrets;
pub mod submit;
pub mod validation;

pub use config::{load_config, Config, DatabaseConfig};
pub use db::{with_session, Database, DatabaseError, Session};
pub use error::{ConfigError, RenderdeskError, Result};
pub use farm::{DeadlineClient, DryRunFarm, FarmClient, FarmError};
pub use frames::{format_range, frame_list, frame_span, FrameList, ParseError};
pub use model::{JobStatus, LightPreset, MayaJob, NukeJob, RenderLayer};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use submit::{submit_job, SubmissionReport, SubmitError, SubmitSettings};
pub use validation::ValidationError;
