use std::path::PathBuf;
use std::time::Duration;

use crate::state::{Preferences, RouteId};

/// Commands for the app layer; the core never performs I/O itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartUpload {
        file: PathBuf,
        start_address: String,
    },
    CancelUpload,
    FetchRoutes,
    FetchStatistics,
    FetchMap,
    AddRoute {
        start_address: String,
        end_address: String,
        notes: String,
    },
    UpdateRoute {
        id: RouteId,
        start_address: String,
        end_address: String,
        notes: String,
    },
    DeleteRoute {
        id: RouteId,
    },
    ExportCsv,
    BackupDatabase,
    ClearDatabase,
    SavePreferences(Preferences),
    /// Reset the upload form after a completed batch, once the delay
    /// elapses.
    ScheduleUploadReset {
        delay: Duration,
    },
}
