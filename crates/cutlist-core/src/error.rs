use thiserror::Error;
use uuid::Uuid;

use crate::timeline::TimelinePosition;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("clip not found: {0}")]
    ClipNotFound(Uuid),

    #[error("clip overlap detected at timeline position {position:?}")]
    ClipOverlap { position: TimelinePosition },

    #[error("invalid time range: start {start:?} >= end {end:?}")]
    InvalidTimeRange {
        start: TimelinePosition,
        end: TimelinePosition,
    },

    #[error("source window end {end:?} exceeds source duration {source_duration:?}")]
    SourceWindowOutOfBounds {
        end: TimelinePosition,
        source_duration: TimelinePosition,
    },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
