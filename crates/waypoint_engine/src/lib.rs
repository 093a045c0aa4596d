//! Waypoint engine: stream consumption, route API client, and effect IO.
mod api;
mod engine;
mod ndjson;
mod persist;
mod types;
mod upload;

// Re-exported so pump callers can construct cancellation tokens without
// depending on tokio-util directly.
pub use tokio_util::sync::CancellationToken;

pub use api::RouteApi;
pub use engine::EngineHandle;
pub use ndjson::{parse_record, NdjsonDecoder};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, ApiOp, ApiOutcome, BatchRecord, ClientSettings, EngineEvent, MapFragment, NewRoute,
    RouteDto, RouteId, StatisticsDto, UploadEvent, UploadRequest,
};
pub use upload::{BatchUploader, ChannelUploadSink, ReqwestUploader, UploadSink};
