use std::time::Duration;

use crate::state::{ApiAction, AppState, NoticeKind, SessionState};
use crate::{Effect, Msg};

/// Delay before a completed upload's form state is cleared.
pub const UPLOAD_RESET_DELAY: Duration = Duration::from_secs(5);

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadSubmitted {
            file,
            start_address,
        } => {
            // The boundary refuses double submissions; treat one as a no-op
            // here so the core stays total.
            if state.upload().state() == SessionState::Running {
                return (state, Vec::new());
            }
            state.begin_upload();
            vec![Effect::StartUpload {
                file,
                start_address,
            }]
        }
        Msg::UploadOpened => {
            if state.upload_mut().open() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadProgress {
            current,
            total,
            address,
            success,
            error,
        } => {
            if state
                .upload_mut()
                .record_progress(current, total, address, success, error)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadCompleted { successful, total } => {
            if !state.upload_mut().record_complete(successful, total) {
                return (state, Vec::new());
            }
            let mut message =
                format!("Successfully processed {successful} out of {total} destinations.");
            if successful < total {
                message.push_str(" Some destinations failed - see log for details.");
            }
            state.push_notice(NoticeKind::Success, message);
            vec![
                Effect::FetchRoutes,
                Effect::FetchMap,
                Effect::FetchStatistics,
                Effect::ScheduleUploadReset {
                    delay: UPLOAD_RESET_DELAY,
                },
            ]
        }
        Msg::UploadErrored { error } => {
            if state.upload_mut().record_error(error.clone()) {
                state.push_notice(NoticeKind::Error, format!("Error: {error}"));
            }
            Vec::new()
        }
        Msg::UploadTransportFailed { message } => {
            if state.upload_mut().record_transport_failure(message.clone()) {
                state.push_notice(NoticeKind::Error, format!("Error: {message}"));
            }
            Vec::new()
        }
        Msg::UploadCancelRequested => {
            if state.upload().state() == SessionState::Running {
                vec![Effect::CancelUpload]
            } else {
                Vec::new()
            }
        }
        Msg::UploadResetDue => {
            // Only a completed form resets; a failed one keeps its log and
            // error visible until the next submission.
            if state.upload().state() == SessionState::Completed {
                state.begin_upload();
            }
            Vec::new()
        }

        Msg::RoutesRequested => vec![Effect::FetchRoutes],
        Msg::RoutesLoaded(routes) => {
            state.set_routes(routes);
            Vec::new()
        }
        Msg::RouteFormSubmitted {
            start_address,
            end_address,
            notes,
        } => vec![Effect::AddRoute {
            start_address,
            end_address,
            notes,
        }],
        Msg::RouteEditSubmitted {
            id,
            start_address,
            end_address,
            notes,
        } => vec![Effect::UpdateRoute {
            id,
            start_address,
            end_address,
            notes,
        }],
        Msg::RouteDeleteRequested { id } => vec![Effect::DeleteRoute { id }],
        Msg::RequestSucceeded { action } => match action {
            ApiAction::Backup => {
                state.push_notice(
                    NoticeKind::Success,
                    "Database backed up successfully".to_string(),
                );
                Vec::new()
            }
            // Mutations invalidate every cached downstream view.
            ApiAction::AddRoute
            | ApiAction::UpdateRoute
            | ApiAction::DeleteRoute
            | ApiAction::ClearRoutes => vec![
                Effect::FetchRoutes,
                Effect::FetchMap,
                Effect::FetchStatistics,
            ],
            _ => Vec::new(),
        },
        Msg::RequestFailed { action, message } => {
            let reason = message.unwrap_or_else(|| action.user_message().to_string());
            state.push_notice(NoticeKind::Error, format!("Error: {reason}"));
            Vec::new()
        }

        Msg::StatisticsRequested => vec![Effect::FetchStatistics],
        Msg::StatisticsLoaded(stats) => {
            state.set_stats(stats);
            Vec::new()
        }
        Msg::MapRequested => vec![Effect::FetchMap],
        Msg::MapLoaded { html } => {
            state.set_map_html(html);
            Vec::new()
        }
        Msg::ExportRequested => vec![Effect::ExportCsv],
        Msg::ExportFinished { path } => {
            state.push_notice(NoticeKind::Info, format!("Exported routes to {path}"));
            state.set_export_path(path);
            Vec::new()
        }
        Msg::BackupRequested => vec![Effect::BackupDatabase],
        Msg::ClearRequested => vec![Effect::ClearDatabase],

        Msg::SortColumnClicked(column) => {
            state.toggle_sort(column);
            vec![Effect::SavePreferences(state.prefs())]
        }
        Msg::UnitSelected(unit) => {
            state.set_unit(unit);
            vec![Effect::SavePreferences(state.prefs())]
        }
        Msg::RestorePreferences(prefs) => {
            state.set_prefs(prefs);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
