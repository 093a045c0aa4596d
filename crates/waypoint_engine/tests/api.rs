use waypoint_engine::{ApiError, ClientSettings, NewRoute, RouteApi};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    }
}

fn new_route() -> NewRoute {
    NewRoute {
        start_address: "Home".to_string(),
        end_address: "Office".to_string(),
        notes: "weekday".to_string(),
    }
}

#[tokio::test]
async fn routes_parse_with_optional_notes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_routes"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"id":1,"start":"Home","end":"Office","distance":12.5,"date":"2024-03-01","notes":"weekday"},
                {"id":2,"start":"Home","end":"Gym","distance":3.1,"date":"2024-03-02 09:15:00"}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    let routes = api.routes().await.expect("routes");
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].id, 1);
    assert_eq!(routes[0].notes, "weekday");
    assert_eq!(routes[1].notes, "");
    assert_eq!(routes[1].distance, 3.1);
}

#[tokio::test]
async fn add_route_posts_json_and_reads_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_route"))
        .and(body_json(serde_json::json!({
            "start_address": "Home",
            "end_address": "Office",
            "notes": "weekday",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success":true,"distance":12.5}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    api.add_route(&new_route()).await.expect("ack");
}

#[tokio::test]
async fn rejected_update_surfaces_server_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/update_route/7"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success":false,"error":"Could not calculate new route"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    let err = api.update_route(7, &new_route()).await.unwrap_err();
    match err {
        ApiError::Rejected(reason) => assert_eq!(reason, "Could not calculate new route"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn delete_failure_with_status_and_body_prefers_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/delete_route/3"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            r#"{"success":false,"error":"database is locked","route_id":3}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    let err = api.delete_route(3).await.unwrap_err();
    match err {
        ApiError::Rejected(reason) => assert_eq!(reason, "database is locked"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn statistics_ignore_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"total_routes":4,"total_distance":48.25,"average_distance":12.06,"daily_routes":{"2024-03-01":2}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    let stats = api.statistics().await.expect("statistics");
    assert_eq!(stats.total_routes, 4);
    assert_eq!(stats.total_distance, 48.25);
}

#[tokio::test]
async fn map_returns_opaque_html_or_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_map"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"html":"<div class=\"folium-map\"></div>","regenerated":true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    let fragment = api.map().await.expect("map");
    assert_eq!(fragment.html, "<div class=\"folium-map\"></div>");

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/get_map"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"error":"Failed to generate map","details":"boom"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = api.map().await.unwrap_err();
    match err {
        ApiError::Rejected(reason) => assert_eq!(reason, "Failed to generate map"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn export_csv_persists_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export_csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("ID,Start Address,End Address\n1,Home,Office\n", "text/csv"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let api = RouteApi::new(ClientSettings {
        base_url: server.uri(),
        export_dir: dir.path().to_path_buf(),
        ..ClientSettings::default()
    })
    .expect("client");

    let path = api.export_csv().await.expect("export");
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("routes_export_"));
    assert!(name.ends_with(".csv"));

    let content = std::fs::read_to_string(path).expect("read export");
    assert!(content.contains("Home,Office"));
}

#[tokio::test]
async fn backup_and_clear_read_plain_acks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backup_database"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success":true,"backup_path":"uploads/backups/routes_backup.db"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clear_database"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"success":true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let api = RouteApi::new(settings_for(&server)).expect("client");
    api.backup().await.expect("backup");
    api.clear().await.expect("clear");
}
