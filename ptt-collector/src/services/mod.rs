//! Collection pipeline
//!
//! Data flow for one run:
//! ScheduleCoordinator / HTTP handler → CollectionOrchestrator →
//! SourceAdapter (fetch) → TableExtractor (HTML only) → RecordAssembler
//! (TimeNormalizer, DateNormalizer) → PersistenceGateway.
//!
//! Every stage returns [`CollectionError`]; the orchestrator is the only place
//! errors are translated into a [`CollectionResponse`].

pub mod collection_orchestrator;
pub mod date_normalizer;
pub mod record_assembler;
pub mod schedule_coordinator;
pub mod sources;
pub mod table_extractor;
pub mod time_normalizer;

pub use collection_orchestrator::{CollectionOrchestrator, LastCollection};
pub use schedule_coordinator::{ScheduleCoordinator, Trigger, TRIGGERS};
pub use sources::{RawPayload, SourceAdapter, Sources};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ptt_common::StoredPrayerTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline error taxonomy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// Upstream unreachable or returned a non-success status (carries status text)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Expected table structure absent or malformed; the whole run is aborted
    #[error("Unexpected source markup: {0}")]
    MarkupShape(String),

    /// Insert failed or stored nothing
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Anything else, with the original message
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl CollectionError {
    pub fn status(&self) -> CollectionStatus {
        match self {
            CollectionError::SourceUnavailable(_) => CollectionStatus::Unavailable,
            CollectionError::MarkupShape(_) => CollectionStatus::MalformedSource,
            CollectionError::Persistence(_) => CollectionStatus::PersistenceFailed,
            CollectionError::Unknown(_) => CollectionStatus::Internal,
        }
    }
}

impl From<reqwest::Error> for CollectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CollectionError::SourceUnavailable(err.to_string())
        } else {
            CollectionError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::Unknown(format!("JSON decode failed: {}", err))
    }
}

/// Categorical result code of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Ok,
    InvalidArgument,
    Unavailable,
    MalformedSource,
    PersistenceFailed,
    Internal,
}

impl CollectionStatus {
    pub fn http_status(&self) -> StatusCode {
        match self {
            CollectionStatus::Ok => StatusCode::OK,
            CollectionStatus::InvalidArgument => StatusCode::BAD_REQUEST,
            CollectionStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            CollectionStatus::MalformedSource => StatusCode::BAD_GATEWAY,
            CollectionStatus::PersistenceFailed | CollectionStatus::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Uniform `{status, body | error}` result of one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub status: CollectionStatus,
    /// Inserted records on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<StoredPrayerTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionResponse {
    pub fn ok(body: Vec<StoredPrayerTime>) -> Self {
        Self {
            status: CollectionStatus::Ok,
            body: Some(body),
            error: None,
        }
    }

    pub fn failed(err: &CollectionError) -> Self {
        Self {
            status: err.status(),
            body: None,
            error: Some(err.to_string()),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: CollectionStatus::InvalidArgument,
            body: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CollectionStatus::Ok
    }

    /// Number of inserted records (zero on failure)
    pub fn record_count(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

impl IntoResponse for CollectionResponse {
    fn into_response(self) -> Response {
        (self.status.http_status(), Json(self)).into_response()
    }
}
