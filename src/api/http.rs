//! reqwest-backed collaborators for the chat backend.

use std::io::Read;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use hh_base::config::Config;
use hh_base::state::{Suggestion, TriggerKind};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use super::{ApiError, ChatRequest, ChatTransport, ChunkSink, StopRequest, SuggestionSource};

/// Read buffer size for the event stream body.
const STREAM_READ_BUF: usize = 4096;

/// How often a stream worker waiting for body bytes re-checks its abort flag.
const ABORT_POLL: Duration = Duration::from_millis(100);

/// TCP keepalive on the stream socket, so a dead peer eventually errors the read.
const STREAM_KEEPALIVE: Duration = Duration::from_secs(30);

/// Turn a non-success response into `ApiError::Api`.
fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    Err(ApiError::Api { status, body })
}

/// Suggestion bodies come either as a bare list or wrapped by endpoint name.
#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<Suggestion>),
    Files { files: Vec<Suggestion> },
    Actions { actions: Vec<Suggestion> },
}

pub fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, ApiError> {
    let payload: SuggestionPayload = serde_json::from_str(body)?;
    Ok(match payload {
        SuggestionPayload::List(items) => items,
        SuggestionPayload::Files { files } => files,
        SuggestionPayload::Actions { actions } => actions,
    })
}

/// `GET {files|actions}?q=<query>` against the backend.
pub struct HttpSuggestionClient {
    client: Client,
    files_url: String,
    actions_url: String,
}

impl HttpSuggestionClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { client, files_url: config.files_url(), actions_url: config.actions_url() })
    }

    fn url_for(&self, kind: TriggerKind) -> &str {
        match kind {
            TriggerKind::File => &self.files_url,
            TriggerKind::Action => &self.actions_url,
        }
    }
}

impl SuggestionSource for HttpSuggestionClient {
    fn fetch(&self, kind: TriggerKind, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        let response = self.client.get(self.url_for(kind)).query(&[("q", query)]).send()?;
        let body = check_status(response)?.text()?;
        parse_suggestions(&body)
    }
}

enum BodyRead {
    Data(Vec<u8>),
    Eof,
    Failed(std::io::Error),
}

/// Forward `body` to `sink` until EOF, abort, or `idle_timeout` without bytes.
///
/// Blocking reads happen on a detached reader thread, so an aborted session
/// releases its worker at once. The reader drops the body (and its socket) at
/// its next read once nobody is listening.
pub fn pump_body<R>(mut body: R, sink: &ChunkSink, idle_timeout: Duration) -> Result<(), ApiError>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(8);
    let reader_id = sink.session_id().to_string();
    std::thread::spawn(move || {
        let mut buf = [0u8; STREAM_READ_BUF];
        loop {
            let read = match body.read(&mut buf) {
                Ok(0) => BodyRead::Eof,
                Ok(n) => BodyRead::Data(buf[..n].to_vec()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => BodyRead::Failed(e),
            };
            let last = !matches!(read, BodyRead::Data(_));
            if tx.send(read).is_err() || last {
                break;
            }
        }
        log::debug!("stream {} reader released", reader_id);
    });

    let mut total_bytes: usize = 0;
    let mut last_data = Instant::now();
    loop {
        if sink.is_aborted() {
            log::debug!("stream {} aborted after {} bytes", sink.session_id(), total_bytes);
            return Ok(());
        }
        match rx.recv_timeout(ABORT_POLL) {
            Ok(BodyRead::Data(bytes)) => {
                total_bytes += bytes.len();
                last_data = Instant::now();
                if !sink.chunk(bytes) {
                    return Ok(());
                }
            }
            Ok(BodyRead::Eof) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
            Ok(BodyRead::Failed(e)) => {
                return Err(ApiError::StreamRead(format!(
                    "{} (kind: {:?}, after {} bytes)",
                    e,
                    e.kind(),
                    total_bytes
                )));
            }
            Err(RecvTimeoutError::Timeout) => {
                if last_data.elapsed() >= idle_timeout {
                    return Err(ApiError::StreamRead(format!(
                        "no data for {}s (after {} bytes)",
                        idle_timeout.as_secs(),
                        total_bytes
                    )));
                }
            }
        }
    }
}

/// Streaming chat over HTTP. The stream has no overall timeout, only an idle
/// limit; stop requests use the configured request timeout.
pub struct HttpChatTransport {
    stream_client: Client,
    stop_client: Client,
    stream_url: String,
    stop_url: String,
    idle_timeout: Duration,
}

impl HttpChatTransport {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let stream_client = Client::builder().timeout(None).tcp_keepalive(STREAM_KEEPALIVE).build()?;
        let stop_client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            stream_client,
            stop_client,
            stream_url: config.stream_url(),
            stop_url: config.stop_url(),
            idle_timeout: config.stream_idle_timeout(),
        })
    }
}

impl ChatTransport for HttpChatTransport {
    fn stream(&self, request: &ChatRequest, sink: &ChunkSink) -> Result<(), ApiError> {
        let response = self
            .stream_client
            .post(&self.stream_url)
            .header("accept", "text/event-stream")
            .json(request)
            .send()?;
        let response = check_status(response)?;
        sink.opened();
        pump_body(response, sink, self.idle_timeout)
    }

    fn stop(&self, stream_id: &str) -> Result<(), ApiError> {
        let response = self.stop_client.post(&self.stop_url).json(&StopRequest { stream_id }).send()?;
        check_status(response)?;
        Ok(())
    }
}
