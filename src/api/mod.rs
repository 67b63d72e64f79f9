//! Collaborator interfaces: suggestion lookup and the streaming chat service.
//!
//! Calls are blocking and run on worker threads; results come back to the
//! app over mpsc channels and are applied on the app's thread.

pub mod error;
pub mod frames;
pub mod http;
pub mod memory;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use hh_base::state::{Attachment, Suggestion, TriggerContext, TriggerKind};
use serde::Serialize;

pub use error::ApiError;

/// Body of a streaming chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub attachments: Vec<Attachment>,
    pub model: String,
    pub stream_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Body of a stop request.
#[derive(Debug, Serialize)]
pub struct StopRequest<'a> {
    pub stream_id: &'a str,
}

/// What a transport worker reports back, in delivery order.
#[derive(Debug)]
pub enum TransportEventKind {
    /// Response headers arrived with a success status
    Opened,
    /// Raw body bytes, split wherever the network split them
    Chunk(Vec<u8>),
    /// Body ended normally
    Closed,
    /// Stream never opened or broke mid-flight
    Failed(ApiError),
}

#[derive(Debug)]
pub struct TransportEvent {
    pub session_id: String,
    pub kind: TransportEventKind,
}

/// Hands chunks from a transport worker to the app, tagged with the session id.
pub struct ChunkSink {
    session_id: String,
    tx: Sender<TransportEvent>,
    abort: Arc<AtomicBool>,
}

impl ChunkSink {
    pub fn new(session_id: String, tx: Sender<TransportEvent>, abort: Arc<AtomicBool>) -> Self {
        Self { session_id, tx, abort }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The session was cancelled or finished; the worker should stop reading.
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    fn send(&self, kind: TransportEventKind) -> bool {
        self.tx.send(TransportEvent { session_id: self.session_id.clone(), kind }).is_ok()
    }

    pub fn opened(&self) -> bool {
        self.send(TransportEventKind::Opened)
    }

    /// Forward one chunk. Returns false when the worker should stop.
    pub fn chunk(&self, bytes: Vec<u8>) -> bool {
        !self.is_aborted() && self.send(TransportEventKind::Chunk(bytes))
    }
}

/// Suggestion lookup keyed by trigger kind and query.
pub trait SuggestionSource: Send + Sync {
    fn fetch(&self, kind: TriggerKind, query: &str) -> Result<Vec<Suggestion>, ApiError>;
}

/// Streaming chat service.
pub trait ChatTransport: Send + Sync {
    /// Open the stream and forward body chunks to `sink` until the body ends,
    /// the sink reports abort, or an error occurs.
    fn stream(&self, request: &ChatRequest, sink: &ChunkSink) -> Result<(), ApiError>;

    /// Ask the backend to stop `stream_id`. No response body is expected.
    fn stop(&self, stream_id: &str) -> Result<(), ApiError>;
}

/// Result of one suggestion fetch, tagged for the last-query-wins check.
#[derive(Debug)]
pub struct SuggestionResult {
    pub generation: u64,
    pub context: TriggerContext,
    pub result: Result<Vec<Suggestion>, ApiError>,
}

/// Run `transport.stream` on a worker thread. Exactly one `Closed` or
/// `Failed` event follows whatever chunks were forwarded.
pub fn start_streaming(transport: Arc<dyn ChatTransport>, request: ChatRequest, sink: ChunkSink) {
    std::thread::spawn(move || {
        let kind = match transport.stream(&request, &sink) {
            Ok(()) => TransportEventKind::Closed,
            Err(e) => TransportEventKind::Failed(e),
        };
        let _ = sink.send(kind);
    });
}

/// Fire-and-forget stop request.
pub fn request_stop(transport: Arc<dyn ChatTransport>, stream_id: String) {
    std::thread::spawn(move || {
        if let Err(e) = transport.stop(&stream_id) {
            log::warn!("stop request for stream {} failed: {}", stream_id, e);
        }
    });
}

/// Fetch suggestions on a worker thread.
pub fn start_suggestion_fetch(
    source: Arc<dyn SuggestionSource>,
    generation: u64,
    context: TriggerContext,
    tx: Sender<SuggestionResult>,
) {
    std::thread::spawn(move || {
        let result = source.fetch(context.kind, &context.query);
        let _ = tx.send(SuggestionResult { generation, context, result });
    });
}
