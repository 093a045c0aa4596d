use std::sync::Once;

use waypoint_core::{
    update, ApiAction, AppState, DistanceUnit, Effect, Msg, NoticeKind, Preferences, RouteRow,
    RouteStats, SortColumn, SortConfig, SortDirection,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn route(id: u64, start: &str, distance_km: f64, date: &str) -> RouteRow {
    RouteRow {
        id,
        start: start.to_string(),
        end: "Office".to_string(),
        distance_km,
        date: date.to_string(),
        notes: String::new(),
    }
}

#[test]
fn routes_request_emits_fetch_effect() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::RoutesRequested);
    assert_eq!(effects, vec![Effect::FetchRoutes]);
}

#[test]
fn loaded_routes_are_sorted_and_formatted_by_preferences() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::RoutesLoaded(vec![
            route(1, "Alpha", 10.0, "2024-01-01"),
            route(2, "Beta", 2.0, "2024-02-01"),
        ]),
    );

    // Default sort is date descending, default unit miles.
    let view = state.view();
    assert_eq!(view.routes[0].id, 2);
    assert_eq!(view.routes[1].id, 1);
    assert_eq!(view.routes[1].distance, "6.21");

    let (state, effects) = update(state, Msg::UnitSelected(DistanceUnit::Kilometres));
    assert_eq!(
        effects,
        vec![Effect::SavePreferences(Preferences {
            unit: DistanceUnit::Kilometres,
            sort: SortConfig::default(),
        })]
    );
    let view = state.view();
    assert_eq!(view.routes[1].distance, "10.00");

    let (state, _) = update(state, Msg::SortColumnClicked(SortColumn::Distance));
    let view = state.view();
    assert_eq!(view.sort.column, SortColumn::Distance);
    assert_eq!(view.sort.direction, SortDirection::Ascending);
    assert_eq!(view.routes[0].id, 2);
}

#[test]
fn clicking_active_sort_column_flips_direction() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SortColumnClicked(SortColumn::Date));
    // Date was already active, so the first click flips descending -> ascending.
    assert_eq!(state.prefs().sort.direction, SortDirection::Ascending);

    let (state, effects) = update(state, Msg::SortColumnClicked(SortColumn::Date));
    assert_eq!(state.prefs().sort.direction, SortDirection::Descending);
    assert_eq!(effects, vec![Effect::SavePreferences(state.prefs())]);
}

#[test]
fn route_mutations_trigger_downstream_refresh() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::RouteFormSubmitted {
            start_address: "Home".to_string(),
            end_address: "Office".to_string(),
            notes: "weekday".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::AddRoute {
            start_address: "Home".to_string(),
            end_address: "Office".to_string(),
            notes: "weekday".to_string(),
        }]
    );

    let (_state, effects) = update(
        state,
        Msg::RequestSucceeded {
            action: ApiAction::AddRoute,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::FetchRoutes,
            Effect::FetchMap,
            Effect::FetchStatistics,
        ]
    );
}

#[test]
fn delete_and_clear_also_refresh() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RouteDeleteRequested { id: 9 });
    assert_eq!(effects, vec![Effect::DeleteRoute { id: 9 }]);

    let (_state, effects) = update(
        state,
        Msg::RequestSucceeded {
            action: ApiAction::ClearRoutes,
        },
    );
    assert_eq!(effects.len(), 3);
}

#[test]
fn backup_success_notifies_without_refresh() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::RequestSucceeded {
            action: ApiAction::Backup,
        },
    );
    assert!(effects.is_empty());
    let notices = state.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].message, "Database backed up successfully");
}

#[test]
fn request_failure_prefers_server_reason_over_generic() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::RequestFailed {
            action: ApiAction::UpdateRoute,
            message: Some("Could not calculate new route".to_string()),
        },
    );
    assert_eq!(
        state.notices()[0].message,
        "Error: Could not calculate new route"
    );

    let (state, _) = update(
        state,
        Msg::RequestFailed {
            action: ApiAction::DeleteRoute,
            message: None,
        },
    );
    assert_eq!(state.notices()[1].message, "Error: Could not delete route");
}

#[test]
fn statistics_and_map_land_in_the_view() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::StatisticsLoaded(RouteStats {
            total_routes: 3,
            total_distance_km: 30.0,
            average_distance_km: 10.0,
        }),
    );
    let view = state.view();
    let stats = view.stats.expect("statistics present");
    assert_eq!(stats.total_routes, 3);
    assert_eq!(stats.total_distance, "18.64 mi");
    assert_eq!(stats.average_distance, "6.21 mi");

    let (state, _) = update(
        state,
        Msg::MapLoaded {
            html: "<div id=\"map\"></div>".to_string(),
        },
    );
    assert_eq!(
        state.view().map_html.as_deref(),
        Some("<div id=\"map\"></div>")
    );
}

#[test]
fn export_finish_records_path_and_notice() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ExportRequested);
    assert_eq!(effects, vec![Effect::ExportCsv]);

    let (state, _) = update(
        state,
        Msg::ExportFinished {
            path: "routes_export_20240301_120000.csv".to_string(),
        },
    );
    assert_eq!(
        state.export_path(),
        Some("routes_export_20240301_120000.csv")
    );
    assert_eq!(state.notices()[0].kind, NoticeKind::Info);
}

#[test]
fn restored_preferences_apply_without_effects() {
    init_logging();
    let prefs = Preferences {
        unit: DistanceUnit::Kilometres,
        sort: SortConfig {
            column: SortColumn::Start,
            direction: SortDirection::Ascending,
        },
    };
    let (mut state, effects) = update(AppState::new(), Msg::RestorePreferences(prefs));
    assert!(effects.is_empty());
    assert_eq!(state.prefs(), prefs);
    assert!(state.consume_dirty());
}
