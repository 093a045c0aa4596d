use std::path::PathBuf;

use crate::format::{DistanceUnit, SortColumn};
use crate::state::{ApiAction, Preferences, RouteId, RouteRow, RouteStats};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the upload form (boundary-validated: file exists and
    /// the starting point is non-empty).
    UploadSubmitted {
        file: PathBuf,
        start_address: String,
    },
    /// The streamed request opened successfully.
    UploadOpened,
    /// One per-address record from the batch stream.
    UploadProgress {
        current: u64,
        total: u64,
        address: String,
        success: bool,
        error: Option<String>,
    },
    /// Producer finished the batch.
    UploadCompleted { successful: u64, total: u64 },
    /// Producer reported a fatal error; the message is shown verbatim.
    UploadErrored { error: String },
    /// Transport died; the message is a generic diagnostic, the raw error
    /// goes to the log instead.
    UploadTransportFailed { message: String },
    /// User asked to stop an in-flight upload.
    UploadCancelRequested,
    /// Scheduled form reset after a completed upload fired.
    UploadResetDue,

    RoutesRequested,
    RoutesLoaded(Vec<RouteRow>),
    /// User submitted the add-route form.
    RouteFormSubmitted {
        start_address: String,
        end_address: String,
        notes: String,
    },
    /// User submitted the edit-route form.
    RouteEditSubmitted {
        id: RouteId,
        start_address: String,
        end_address: String,
        notes: String,
    },
    RouteDeleteRequested { id: RouteId },
    /// A mutating server operation succeeded.
    RequestSucceeded { action: ApiAction },
    /// A server operation failed; `message` carries a server-provided
    /// reason when one exists, otherwise the notice falls back to a
    /// generic per-operation message.
    RequestFailed {
        action: ApiAction,
        message: Option<String>,
    },

    StatisticsRequested,
    StatisticsLoaded(RouteStats),
    MapRequested,
    MapLoaded { html: String },
    ExportRequested,
    ExportFinished { path: String },
    BackupRequested,
    ClearRequested,

    SortColumnClicked(SortColumn),
    UnitSelected(DistanceUnit),
    /// Restore persisted preferences on startup.
    RestorePreferences(Preferences),
    /// Fallback for placeholder wiring.
    NoOp,
}
