use waypoint_core::{AppViewModel, NoticeKind, UploadLogRow};

const PROGRESS_BAR_WIDTH: usize = 24;

/// One-line progress bar, e.g. `[######..................] 3/12  Processing: 221B Baker St`.
pub fn progress_line(view: &AppViewModel) -> String {
    let filled = (view.upload.progress * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    let bar: String = "#".repeat(filled) + &".".repeat(PROGRESS_BAR_WIDTH - filled);
    let mut line = format!("[{bar}] {}/{}", view.upload.processed, view.upload.total);
    if let Some(address) = &view.upload.current_address {
        line.push_str(&format!("  Processing: {address}"));
    }
    line
}

pub fn log_line(row: &UploadLogRow) -> String {
    if row.success {
        format!("✓ {}", row.address)
    } else {
        format!(
            "✗ {} - {}",
            row.address,
            row.error.as_deref().unwrap_or("failed")
        )
    }
}

/// Fixed-width route table with the distance header carrying the active unit.
pub fn routes_table(view: &AppViewModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<28} {:<28} {:>14} {:<20} {}\n",
        "ID",
        "Start",
        "End",
        format!("Distance ({})", view.unit.suffix()),
        "Date",
        "Notes"
    ));
    for route in &view.routes {
        out.push_str(&format!(
            "{:<6} {:<28} {:<28} {:>14} {:<20} {}\n",
            route.id, route.start, route.end, route.distance, route.date, route.notes
        ));
    }
    if view.routes.is_empty() {
        out.push_str("(no routes)\n");
    }
    out
}

pub fn stats_panel(view: &AppViewModel) -> String {
    match &view.stats {
        Some(stats) => format!(
            "Total routes:     {}\nTotal distance:   {}\nAverage distance: {}\n",
            stats.total_routes, stats.total_distance, stats.average_distance
        ),
        None => "(no statistics)\n".to_string(),
    }
}

/// Print notices to the right stream; returns whether any was an error.
pub fn print_notices(view: &AppViewModel) -> bool {
    let mut saw_error = false;
    for notice in &view.notices {
        match notice.kind {
            NoticeKind::Error => {
                saw_error = true;
                eprintln!("{}", notice.message);
            }
            NoticeKind::Success | NoticeKind::Info => println!("{}", notice.message),
        }
    }
    saw_error
}

#[cfg(test)]
mod tests {
    use super::{log_line, progress_line, routes_table};
    use waypoint_core::{
        update, AppState, DistanceUnit, Msg, RouteRow, UploadLogRow,
    };

    #[test]
    fn progress_line_reflects_counts_and_current_address() {
        let state = AppState::new();
        let (state, _) = update(
            state,
            Msg::UploadSubmitted {
                file: "a.txt".into(),
                start_address: "Depot".into(),
            },
        );
        let (state, _) = update(state, Msg::UploadOpened);
        let (state, _) = update(
            state,
            Msg::UploadProgress {
                current: 1,
                total: 4,
                address: "221B Baker St".into(),
                success: true,
                error: None,
            },
        );
        let line = progress_line(&state.view());
        assert!(line.contains("1/4"));
        assert!(line.ends_with("Processing: 221B Baker St"));
    }

    #[test]
    fn log_lines_mirror_item_outcome() {
        let ok = UploadLogRow {
            address: "A".into(),
            success: true,
            error: None,
        };
        let failed = UploadLogRow {
            address: "B".into(),
            success: false,
            error: Some("not found".into()),
        };
        assert_eq!(log_line(&ok), "✓ A");
        assert_eq!(log_line(&failed), "✗ B - not found");
    }

    #[test]
    fn table_header_tracks_unit_preference() {
        let state = AppState::new();
        let (state, _) = update(
            state,
            Msg::RoutesLoaded(vec![RouteRow {
                id: 1,
                start: "Home".into(),
                end: "Office".into(),
                distance_km: 10.0,
                date: "2024-03-01".into(),
                notes: String::new(),
            }]),
        );
        let table = routes_table(&state.view());
        assert!(table.contains("Distance (mi)"));
        assert!(table.contains("6.21"));

        let (state, _) = update(state, Msg::UnitSelected(DistanceUnit::Kilometres));
        let table = routes_table(&state.view());
        assert!(table.contains("Distance (km)"));
        assert!(table.contains("10.00"));
    }
}
