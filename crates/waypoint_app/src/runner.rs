use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use waypoint_core::{
    update, ApiAction, AppState, AppViewModel, Effect, Msg, RouteRow, RouteStats,
};
use waypoint_engine::{
    ApiError, ApiOp, ApiOutcome, EngineEvent, EngineHandle, NewRoute, RouteDto, StatisticsDto,
    UploadEvent, UploadRequest,
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Single-threaded dispatch loop: engine events map to messages, the pure
/// update runs, and returned effects go back out as engine commands.
/// Messages are dispatched strictly in arrival order.
pub struct Dispatcher {
    engine: EngineHandle,
    state: AppState,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    prefs_dir: PathBuf,
    /// Outstanding one-shot API requests.
    in_flight: usize,
    /// An upload stream stays active until its terminal event.
    upload_active: bool,
}

impl Dispatcher {
    pub fn new(engine: EngineHandle, prefs_dir: PathBuf) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            engine,
            state: AppState::new(),
            msg_tx,
            msg_rx,
            prefs_dir,
            in_flight: 0,
            upload_active: false,
        }
    }

    /// Feeds the seed messages, then runs until every requested effect has
    /// answered and any upload stream has reached a terminal state.
    pub fn run_until_settled(
        mut self,
        seeds: Vec<Msg>,
        render: &mut dyn FnMut(&AppViewModel),
    ) -> AppState {
        for msg in seeds {
            self.dispatch(msg, render);
        }

        loop {
            let mut progressed = false;
            while let Ok(msg) = self.msg_rx.try_recv() {
                self.dispatch(msg, render);
                progressed = true;
            }
            while let Some(event) = self.engine.try_recv() {
                let msg = self.map_event(event);
                self.dispatch(msg, render);
                progressed = true;
            }
            if self.in_flight == 0 && !self.upload_active {
                break;
            }
            if !progressed {
                thread::sleep(POLL_INTERVAL);
            }
        }

        self.state
    }

    fn dispatch(&mut self, msg: Msg, render: &mut dyn FnMut(&AppViewModel)) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = if state.consume_dirty() {
            Some(state.view())
        } else {
            None
        };
        self.state = state;
        self.run_effects(effects);
        if let Some(view) = view {
            render(&view);
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload {
                    file,
                    start_address,
                } => {
                    client_info!("StartUpload file={:?}", file);
                    self.upload_active = true;
                    self.engine.start_upload(UploadRequest {
                        addresses_path: file,
                        start_address,
                    });
                }
                Effect::CancelUpload => self.engine.cancel_upload(),
                Effect::FetchRoutes => {
                    self.in_flight += 1;
                    self.engine.fetch_routes();
                }
                Effect::FetchStatistics => {
                    self.in_flight += 1;
                    self.engine.fetch_statistics();
                }
                Effect::FetchMap => {
                    self.in_flight += 1;
                    self.engine.fetch_map();
                }
                Effect::AddRoute {
                    start_address,
                    end_address,
                    notes,
                } => {
                    self.in_flight += 1;
                    self.engine.add_route(NewRoute {
                        start_address,
                        end_address,
                        notes,
                    });
                }
                Effect::UpdateRoute {
                    id,
                    start_address,
                    end_address,
                    notes,
                } => {
                    self.in_flight += 1;
                    self.engine.update_route(
                        id,
                        NewRoute {
                            start_address,
                            end_address,
                            notes,
                        },
                    );
                }
                Effect::DeleteRoute { id } => {
                    self.in_flight += 1;
                    self.engine.delete_route(id);
                }
                Effect::ExportCsv => {
                    self.in_flight += 1;
                    self.engine.export_csv();
                }
                Effect::BackupDatabase => {
                    self.in_flight += 1;
                    self.engine.backup_database();
                }
                Effect::ClearDatabase => {
                    self.in_flight += 1;
                    self.engine.clear_database();
                }
                Effect::SavePreferences(prefs) => {
                    crate::persistence::save_preferences(&self.prefs_dir, prefs);
                }
                Effect::ScheduleUploadReset { delay } => {
                    let tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        // The loop may already have exited; that is fine.
                        let _ = tx.send(Msg::UploadResetDue);
                    });
                }
            }
        }
    }

    fn map_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Upload(event) => match event {
                UploadEvent::Opened => Msg::UploadOpened,
                UploadEvent::Progress {
                    current,
                    total,
                    address,
                    success,
                    error,
                } => Msg::UploadProgress {
                    current,
                    total,
                    address,
                    success,
                    error,
                },
                UploadEvent::Completed { successful, total } => {
                    self.upload_active = false;
                    Msg::UploadCompleted { successful, total }
                }
                UploadEvent::Errored { error } => {
                    self.upload_active = false;
                    Msg::UploadErrored { error }
                }
                UploadEvent::TransportFailed { message } => {
                    self.upload_active = false;
                    Msg::UploadTransportFailed { message }
                }
            },
            EngineEvent::Api(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                map_outcome(outcome)
            }
        }
    }
}

fn map_outcome(outcome: ApiOutcome) -> Msg {
    match outcome {
        ApiOutcome::Routes(Ok(routes)) => {
            Msg::RoutesLoaded(routes.into_iter().map(map_route).collect())
        }
        ApiOutcome::Routes(Err(err)) => failure(ApiAction::LoadRoutes, err),
        ApiOutcome::Statistics(Ok(stats)) => Msg::StatisticsLoaded(map_stats(&stats)),
        ApiOutcome::Statistics(Err(err)) => failure(ApiAction::LoadStatistics, err),
        ApiOutcome::Map(Ok(fragment)) => Msg::MapLoaded {
            html: fragment.html,
        },
        ApiOutcome::Map(Err(err)) => failure(ApiAction::LoadMap, err),
        ApiOutcome::Mutation { op, result } => match result {
            Ok(()) => Msg::RequestSucceeded {
                action: map_op(op),
            },
            Err(err) => failure(map_op(op), err),
        },
        ApiOutcome::Export(Ok(path)) => Msg::ExportFinished {
            path: path.display().to_string(),
        },
        ApiOutcome::Export(Err(err)) => failure(ApiAction::ExportCsv, err),
    }
}

fn failure(action: ApiAction, err: ApiError) -> Msg {
    client_warn!("{:?} failed: {}", action, err);
    // Only a server-phrased rejection is user-meaningful; transport and
    // decoding errors fall back to the generic per-operation message.
    let message = match err {
        ApiError::Rejected(reason) => Some(reason),
        _ => None,
    };
    Msg::RequestFailed { action, message }
}

fn map_op(op: ApiOp) -> ApiAction {
    match op {
        ApiOp::AddRoute => ApiAction::AddRoute,
        ApiOp::UpdateRoute => ApiAction::UpdateRoute,
        ApiOp::DeleteRoute => ApiAction::DeleteRoute,
        ApiOp::Backup => ApiAction::Backup,
        ApiOp::Clear => ApiAction::ClearRoutes,
    }
}

fn map_route(dto: RouteDto) -> RouteRow {
    RouteRow {
        id: dto.id,
        start: dto.start,
        end: dto.end,
        distance_km: dto.distance,
        date: dto.date,
        notes: dto.notes,
    }
}

fn map_stats(dto: &StatisticsDto) -> RouteStats {
    RouteStats {
        total_routes: dto.total_routes,
        total_distance_km: dto.total_distance,
        average_distance_km: dto.average_distance,
    }
}
