use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

use client_logging::{client_info, client_warn};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::ndjson::{parse_record, NdjsonDecoder};
use crate::types::{ClientSettings, EngineEvent, UploadEvent, UploadRequest};

// Generic transport diagnostics; the raw error is logged, never shown.
const ERR_UNREACHABLE: &str = "could not reach the server";
const ERR_CLOSED: &str = "connection closed unexpectedly";
const ERR_CANCELLED: &str = "upload cancelled";
const ERR_REJECTED: &str = "server rejected the upload";
const ERR_READ_FILE: &str = "could not read the address file";

static NEXT_BATCH: AtomicU64 = AtomicU64::new(1);

/// Receives pump notifications, one per observable change, in dispatch
/// order.
pub trait UploadSink: Send + Sync {
    fn emit(&self, event: UploadEvent);
}

pub struct ChannelUploadSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelUploadSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl UploadSink for ChannelUploadSink {
    fn emit(&self, event: UploadEvent) {
        let _ = self.tx.send(EngineEvent::Upload(event));
    }
}

/// Owns one batch upload exchange end-to-end.
#[async_trait::async_trait]
pub trait BatchUploader: Send + Sync {
    async fn run(
        &self,
        request: &UploadRequest,
        sink: &dyn UploadSink,
        cancel: CancellationToken,
    );
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: ClientSettings,
}

impl ReqwestUploader {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl BatchUploader for ReqwestUploader {
    async fn run(
        &self,
        request: &UploadRequest,
        sink: &dyn UploadSink,
        cancel: CancellationToken,
    ) {
        let seq = NEXT_BATCH.fetch_add(1, Ordering::Relaxed);
        client_logging::set_batch_seq(seq);
        client_info!(
            "batch {}: uploading {:?} from start address {:?}",
            seq,
            request.addresses_path,
            request.start_address
        );

        let file_bytes = match tokio::fs::read(&request.addresses_path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                client_warn!(
                    "batch {}: failed to read {:?}: {}",
                    seq,
                    request.addresses_path,
                    err
                );
                sink.emit(UploadEvent::TransportFailed {
                    message: ERR_READ_FILE.to_string(),
                });
                return;
            }
        };

        // No whole-request timeout: the response is a long-lived stream
        // whose duration is bounded by the batch, not the client.
        let client = match reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                client_warn!("batch {}: failed to build http client: {}", seq, err);
                sink.emit(UploadEvent::TransportFailed {
                    message: ERR_UNREACHABLE.to_string(),
                });
                return;
            }
        };

        let file_name = request
            .addresses_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "addresses.txt".to_string());
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(file_bytes).file_name(file_name),
            )
            .text("startAddress", request.start_address.clone());
        let url = format!(
            "{}/upload_addresses",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                client_info!("batch {}: cancelled before the request opened", seq);
                sink.emit(UploadEvent::TransportFailed {
                    message: ERR_CANCELLED.to_string(),
                });
                return;
            }
            result = client.post(&url).multipart(form).send() => match result {
                Ok(response) => response,
                Err(err) => {
                    client_warn!("batch {}: transport error before open: {}", seq, err);
                    sink.emit(UploadEvent::TransportFailed {
                        message: ERR_UNREACHABLE.to_string(),
                    });
                    return;
                }
            }
        };

        if !response.status().is_success() {
            client_warn!("batch {}: server answered {}", seq, response.status());
            sink.emit(UploadEvent::TransportFailed {
                message: ERR_REJECTED.to_string(),
            });
            return;
        }

        sink.emit(UploadEvent::Opened);

        let mut decoder = NdjsonDecoder::new();
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    client_info!("batch {}: cancelled mid-stream", seq);
                    sink.emit(UploadEvent::TransportFailed {
                        message: ERR_CANCELLED.to_string(),
                    });
                    return;
                }
                next = stream.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    // Records are dispatched strictly in decode order.
                    for line in decoder.feed(&chunk) {
                        if dispatch(&line, sink) {
                            client_info!("batch {}: terminal record received", seq);
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    client_warn!("batch {}: stream error: {}", seq, err);
                    sink.emit(UploadEvent::TransportFailed {
                        message: ERR_CLOSED.to_string(),
                    });
                    return;
                }
                None => break,
            }
        }

        if let Some(line) = decoder.finish() {
            if dispatch(&line, sink) {
                client_info!("batch {}: terminal record received at stream end", seq);
                return;
            }
        }

        // The producer closed without a terminal record.
        client_warn!("batch {}: stream ended without a terminal record", seq);
        sink.emit(UploadEvent::TransportFailed {
            message: ERR_CLOSED.to_string(),
        });
    }
}

/// Parses and forwards one candidate line; returns whether it was terminal.
fn dispatch(line: &str, sink: &dyn UploadSink) -> bool {
    match parse_record(line) {
        Some(record) => {
            let terminal = record.is_terminal();
            sink.emit(record.into());
            terminal
        }
        None => false,
    }
}
