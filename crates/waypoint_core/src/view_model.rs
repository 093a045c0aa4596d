use crate::format::{compare_routes, format_distance, DistanceUnit, SortConfig};
use crate::state::{AppState, Notice, RouteId, SessionState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub upload: UploadView,
    pub submit_enabled: bool,
    pub notices: Vec<Notice>,
    pub routes: Vec<RouteRowView>,
    pub stats: Option<StatsView>,
    pub map_html: Option<String>,
    pub export_path: Option<String>,
    pub unit: DistanceUnit,
    pub sort: SortConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadView {
    pub state: SessionState,
    pub processed: u64,
    pub total: u64,
    pub success_count: u64,
    /// Fraction in [0,1] for progress display, clamped if the producer
    /// ever reports current > total.
    pub progress: f64,
    pub current_address: Option<String>,
    pub failure: Option<String>,
    /// Most-recent-first for display; the session keeps arrival order.
    pub log: Vec<UploadLogRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLogRow {
    pub address: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRowView {
    pub id: RouteId,
    pub start: String,
    pub end: String,
    pub distance: String,
    pub date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    pub total_routes: u64,
    pub total_distance: String,
    pub average_distance: String,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let prefs = state.prefs();
    let upload = state.upload();

    let progress = if upload.total() == 0 {
        0.0
    } else {
        (upload.processed() as f64 / upload.total() as f64).clamp(0.0, 1.0)
    };

    let log = upload
        .log()
        .iter()
        .rev()
        .map(|item| UploadLogRow {
            address: item.address.clone(),
            success: item.success,
            error: item.error.clone(),
        })
        .collect();

    let mut routes: Vec<_> = state.routes().to_vec();
    routes.sort_by(|a, b| compare_routes(a, b, prefs.sort));
    let routes = routes
        .into_iter()
        .map(|route| RouteRowView {
            id: route.id,
            start: route.start,
            end: route.end,
            distance: format_distance(route.distance_km, prefs.unit),
            date: route.date,
            notes: route.notes,
        })
        .collect();

    let stats = state.stats().map(|stats| StatsView {
        total_routes: stats.total_routes,
        total_distance: format!(
            "{} {}",
            format_distance(stats.total_distance_km, prefs.unit),
            prefs.unit.suffix()
        ),
        average_distance: format!(
            "{} {}",
            format_distance(stats.average_distance_km, prefs.unit),
            prefs.unit.suffix()
        ),
    });

    AppViewModel {
        upload: UploadView {
            state: upload.state(),
            processed: upload.processed(),
            total: upload.total(),
            success_count: upload.success_count(),
            progress,
            current_address: upload.current_address().map(ToOwned::to_owned),
            failure: upload.failure().map(ToOwned::to_owned),
            log,
        },
        submit_enabled: upload.state() != SessionState::Running,
        notices: state.notices().to_vec(),
        routes,
        stats,
        map_html: state.map_html().map(ToOwned::to_owned),
        export_path: state.export_path().map(ToOwned::to_owned),
        unit: prefs.unit,
        sort: prefs.sort,
    }
}
