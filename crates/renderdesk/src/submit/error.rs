use thiserror::Error;

use crate::daily::DailyError;
use crate::db::DatabaseError;
use crate::farm::FarmError;
use crate::frames::ParseError;
use crate::model::JobStatus;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Maya job not found: {id}")]
    JobNotFound { id: String },

    #[error("Layer '{layer}' has invalid frames: {source}")]
    Frames {
        layer: String,
        #[source]
        source: ParseError,
    },

    #[error("Layer '{layer}' has no frames to render")]
    NoFrames { layer: String },

    #[error("Cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Farm error: {0}")]
    Farm(#[from] FarmError),

    #[error("Daily error: {0}")]
    Daily(#[from] DailyError),
}
