use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::persist::PersistError;

pub type RouteId = u64;

/// Connection settings shared by the upload pump and the route API client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applied to plain request/response calls only; the upload stream has
    /// no whole-request deadline.
    pub request_timeout: Duration,
    /// Where CSV exports land.
    pub export_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            export_dir: PathBuf::from("."),
        }
    }
}

/// One wire record from the batch address-ingestion stream, tagged by the
/// `type` field. Lines with an unrecognized tag fail to deserialize and are
/// dropped by the decoder's caller; extra fields (the producer also sends a
/// percentage) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchRecord {
    Progress {
        current: u64,
        total: u64,
        address: String,
        success: bool,
        #[serde(default)]
        error: Option<String>,
    },
    Complete {
        successful: u64,
        total: u64,
    },
    Error {
        error: String,
    },
}

impl BatchRecord {
    /// A terminal record ends the logical batch job regardless of whether
    /// the transport connection itself has closed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchRecord::Complete { .. } | BatchRecord::Error { .. })
    }
}

/// Notification raised by the stream pump, one per observable change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// The streamed request opened; the session is now running.
    Opened,
    Progress {
        current: u64,
        total: u64,
        address: String,
        success: bool,
        error: Option<String>,
    },
    Completed {
        successful: u64,
        total: u64,
    },
    /// Producer-reported fatal error, surfaced verbatim.
    Errored {
        error: String,
    },
    /// Transport-level failure; `message` is a generic diagnostic, the raw
    /// error is logged instead of shown.
    TransportFailed {
        message: String,
    },
}

impl From<BatchRecord> for UploadEvent {
    fn from(record: BatchRecord) -> Self {
        match record {
            BatchRecord::Progress {
                current,
                total,
                address,
                success,
                error,
            } => UploadEvent::Progress {
                current,
                total,
                address,
                success,
                error,
            },
            BatchRecord::Complete { successful, total } => {
                UploadEvent::Completed { successful, total }
            }
            BatchRecord::Error { error } => UploadEvent::Errored { error },
        }
    }
}

/// Everything needed to open one batch upload exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub addresses_path: PathBuf,
    pub start_address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteDto {
    pub id: RouteId,
    pub start: String,
    pub end: String,
    pub distance: f64,
    pub date: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsDto {
    pub total_routes: u64,
    pub total_distance: f64,
    pub average_distance: f64,
}

/// Server-rendered map HTML; opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFragment {
    pub html: String,
}

/// Payload for add/update route requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoute {
    pub start_address: String,
    pub end_address: String,
    pub notes: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Body(String),
    /// The server answered `success: false`; the message is its reason.
    #[error("{0}")]
    Rejected(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Mutating server operations, used to label mutation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOp {
    AddRoute,
    UpdateRoute,
    DeleteRoute,
    Backup,
    Clear,
}

/// Outcome of one route API request.
#[derive(Debug)]
pub enum ApiOutcome {
    Routes(Result<Vec<RouteDto>, ApiError>),
    Statistics(Result<StatisticsDto, ApiError>),
    Map(Result<MapFragment, ApiError>),
    Mutation {
        op: ApiOp,
        result: Result<(), ApiError>,
    },
    Export(Result<PathBuf, ApiError>),
}

#[derive(Debug)]
pub enum EngineEvent {
    Upload(UploadEvent),
    Api(ApiOutcome),
}
