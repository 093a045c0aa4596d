//! Waypoint core: pure state machine and view-model helpers.
mod effect;
mod format;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use format::{
    compare_routes, format_distance, DistanceUnit, SortColumn, SortConfig, SortDirection,
    KM_TO_MILES,
};
pub use msg::Msg;
pub use state::{
    ApiAction, AppState, ItemResult, Notice, NoticeKind, Preferences, RouteId, RouteRow,
    RouteStats, SessionState, UploadSession,
};
pub use update::{update, UPLOAD_RESET_DELAY};
pub use view_model::{AppViewModel, RouteRowView, StatsView, UploadLogRow, UploadView};
