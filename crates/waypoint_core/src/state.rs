use crate::format::{DistanceUnit, SortColumn, SortConfig};
use crate::view_model::AppViewModel;

pub type RouteId = u64;

/// Lifecycle of one batch upload session. Transitions only move forward;
/// a finished session is replaced by a fresh value, never rewound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Outcome of one processed address, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub address: String,
    pub success: bool,
    pub error: Option<String>,
}

/// State for one in-flight batch address upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadSession {
    state: SessionState,
    total: u64,
    processed: u64,
    success_count: u64,
    log: Vec<ItemResult>,
    current_address: Option<String>,
    failure: Option<String>,
}

impl UploadSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn log(&self) -> &[ItemResult] {
        &self.log
    }

    pub fn current_address(&self) -> Option<&str> {
        self.current_address.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Completed | SessionState::Failed)
    }

    /// Idle -> Running, exactly once per session value.
    pub(crate) fn open(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.state = SessionState::Running;
        self.total = 0;
        self.processed = 0;
        self.success_count = 0;
        self.log.clear();
        true
    }

    pub(crate) fn record_progress(
        &mut self,
        current: u64,
        total: u64,
        address: String,
        success: bool,
        error: Option<String>,
    ) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        // The producer's counter is trusted; the view model clamps display.
        self.processed = current;
        self.total = total;
        if success {
            self.success_count += 1;
        }
        self.current_address = Some(address.clone());
        self.log.push(ItemResult {
            address,
            success,
            error,
        });
        true
    }

    pub(crate) fn record_complete(&mut self, successful: u64, total: u64) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Completed;
        self.success_count = successful;
        self.total = total;
        self.current_address = None;
        true
    }

    pub(crate) fn record_error(&mut self, error: String) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Failed;
        self.failure = Some(error);
        true
    }

    /// Transport-level failure: legal from Idle (request never opened) as
    /// well as from Running (stream died before a terminal record).
    pub(crate) fn record_transport_failure(&mut self, message: String) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = SessionState::Failed;
        self.failure = Some(message);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// One user-visible notification. Terminal upload transitions produce
/// exactly one notice each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// One row of the route table. Distances are stored in kilometres and
/// converted only for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub id: RouteId,
    pub start: String,
    pub end: String,
    pub distance_km: f64,
    pub date: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStats {
    pub total_routes: u64,
    pub total_distance_km: f64,
    pub average_distance_km: f64,
}

/// User preferences threaded explicitly into formatting and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub unit: DistanceUnit,
    pub sort: SortConfig,
}

/// Server operations the client can request; used to phrase generic
/// user-facing failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    LoadRoutes,
    AddRoute,
    UpdateRoute,
    DeleteRoute,
    LoadStatistics,
    LoadMap,
    ExportCsv,
    Backup,
    ClearRoutes,
}

impl ApiAction {
    pub fn user_message(self) -> &'static str {
        match self {
            ApiAction::LoadRoutes => "Could not load routes",
            ApiAction::AddRoute => "Could not add route",
            ApiAction::UpdateRoute => "Could not update route",
            ApiAction::DeleteRoute => "Could not delete route",
            ApiAction::LoadStatistics => "Could not load statistics",
            ApiAction::LoadMap => "Could not load map",
            ApiAction::ExportCsv => "Could not export routes",
            ApiAction::Backup => "Could not backup database",
            ApiAction::ClearRoutes => "Could not clear routes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    upload: UploadSession,
    routes: Vec<RouteRow>,
    stats: Option<RouteStats>,
    map_html: Option<String>,
    prefs: Preferences,
    notices: Vec<Notice>,
    export_path: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        crate::view_model::build(self)
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn upload(&self) -> &UploadSession {
        &self.upload
    }

    pub fn routes(&self) -> &[RouteRow] {
        &self.routes
    }

    pub fn stats(&self) -> Option<&RouteStats> {
        self.stats.as_ref()
    }

    pub fn map_html(&self) -> Option<&str> {
        self.map_html.as_deref()
    }

    pub fn prefs(&self) -> Preferences {
        self.prefs
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export_path.as_deref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Installs a fresh session for a new upload. The old session value is
    /// discarded; its terminal state is never rewound.
    pub(crate) fn begin_upload(&mut self) {
        self.upload = UploadSession::default();
        self.mark_dirty();
    }

    pub(crate) fn upload_mut(&mut self) -> &mut UploadSession {
        &mut self.upload
    }

    pub(crate) fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
        self.mark_dirty();
    }

    pub(crate) fn set_routes(&mut self, routes: Vec<RouteRow>) {
        self.routes = routes;
        self.mark_dirty();
    }

    pub(crate) fn set_stats(&mut self, stats: RouteStats) {
        self.stats = Some(stats);
        self.mark_dirty();
    }

    pub(crate) fn set_map_html(&mut self, html: String) {
        self.map_html = Some(html);
        self.mark_dirty();
    }

    pub(crate) fn set_export_path(&mut self, path: String) {
        self.export_path = Some(path);
        self.mark_dirty();
    }

    pub(crate) fn set_unit(&mut self, unit: DistanceUnit) {
        self.prefs.unit = unit;
        self.mark_dirty();
    }

    pub(crate) fn toggle_sort(&mut self, column: SortColumn) {
        self.prefs.sort = self.prefs.sort.toggled(column);
        self.mark_dirty();
    }

    pub(crate) fn set_prefs(&mut self, prefs: Preferences) {
        self.prefs = prefs;
        self.mark_dirty();
    }
}
