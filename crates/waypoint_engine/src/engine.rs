use std::sync::{mpsc, Arc};
use std::thread;

use client_logging::client_warn;
use tokio_util::sync::CancellationToken;

use crate::api::RouteApi;
use crate::types::{
    ApiOp, ApiOutcome, ClientSettings, EngineEvent, NewRoute, RouteId, UploadRequest,
};
use crate::upload::{BatchUploader, ChannelUploadSink, ReqwestUploader};

enum EngineCommand {
    StartUpload { request: UploadRequest },
    CancelUpload,
    Api(ApiCommand),
}

enum ApiCommand {
    Routes,
    Statistics,
    Map,
    Add(NewRoute),
    Update { id: RouteId, route: NewRoute },
    Delete { id: RouteId },
    Export,
    Backup,
    Clear,
}

/// Commands in over a channel, events out over a channel; all I/O runs on a
/// dedicated thread owning a tokio runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let uploader = Arc::new(ReqwestUploader::new(settings.clone()));
            let api = Arc::new(RouteApi::new(settings).expect("http client"));
            // At most one upload runs at a time; the boundary enforces it
            // and this token lets the user stop the one that is running.
            let mut active_upload: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartUpload { request } => {
                        let token = CancellationToken::new();
                        active_upload = Some(token.clone());
                        let uploader = uploader.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let sink = ChannelUploadSink::new(event_tx);
                            uploader.run(&request, &sink, token).await;
                        });
                    }
                    EngineCommand::CancelUpload => {
                        if let Some(token) = active_upload.take() {
                            token.cancel();
                        } else {
                            client_warn!("cancel requested with no active upload");
                        }
                    }
                    EngineCommand::Api(command) => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let outcome = run_api_command(&api, command).await;
                            let _ = event_tx.send(EngineEvent::Api(outcome));
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn start_upload(&self, request: UploadRequest) {
        self.send(EngineCommand::StartUpload { request });
    }

    pub fn cancel_upload(&self) {
        self.send(EngineCommand::CancelUpload);
    }

    pub fn fetch_routes(&self) {
        self.send(EngineCommand::Api(ApiCommand::Routes));
    }

    pub fn fetch_statistics(&self) {
        self.send(EngineCommand::Api(ApiCommand::Statistics));
    }

    pub fn fetch_map(&self) {
        self.send(EngineCommand::Api(ApiCommand::Map));
    }

    pub fn add_route(&self, route: NewRoute) {
        self.send(EngineCommand::Api(ApiCommand::Add(route)));
    }

    pub fn update_route(&self, id: RouteId, route: NewRoute) {
        self.send(EngineCommand::Api(ApiCommand::Update { id, route }));
    }

    pub fn delete_route(&self, id: RouteId) {
        self.send(EngineCommand::Api(ApiCommand::Delete { id }));
    }

    pub fn export_csv(&self) {
        self.send(EngineCommand::Api(ApiCommand::Export));
    }

    pub fn backup_database(&self) {
        self.send(EngineCommand::Api(ApiCommand::Backup));
    }

    pub fn clear_database(&self) {
        self.send(EngineCommand::Api(ApiCommand::Clear));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn run_api_command(api: &RouteApi, command: ApiCommand) -> ApiOutcome {
    match command {
        ApiCommand::Routes => ApiOutcome::Routes(api.routes().await),
        ApiCommand::Statistics => ApiOutcome::Statistics(api.statistics().await),
        ApiCommand::Map => ApiOutcome::Map(api.map().await),
        ApiCommand::Add(route) => ApiOutcome::Mutation {
            op: ApiOp::AddRoute,
            result: api.add_route(&route).await,
        },
        ApiCommand::Update { id, route } => ApiOutcome::Mutation {
            op: ApiOp::UpdateRoute,
            result: api.update_route(id, &route).await,
        },
        ApiCommand::Delete { id } => ApiOutcome::Mutation {
            op: ApiOp::DeleteRoute,
            result: api.delete_route(id).await,
        },
        ApiCommand::Export => ApiOutcome::Export(api.export_csv().await),
        ApiCommand::Backup => ApiOutcome::Mutation {
            op: ApiOp::Backup,
            result: api.backup().await,
        },
        ApiCommand::Clear => ApiOutcome::Mutation {
            op: ApiOp::Clear,
            result: api.clear().await,
        },
    }
}
