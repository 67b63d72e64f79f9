//! Lifecycle of the one in-flight chat request.
//!
//! `start` opens a session and a worker streams raw chunks back as
//! `TransportEvent`s. The app feeds those to `handle_transport` one at a
//! time; this is the only code that writes assistant content into the
//! conversation. Terminal states drop the session, so late events from its
//! worker no longer match and are discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use hh_base::config::constants::{DEFAULT_CANCEL_NOTICE, FALLBACK_MARKER};
use hh_base::state::{Conversation, OutboundMessage};

use crate::api::frames::{FrameDecoder, FrameEvent};
use crate::api::{
    ChatRequest, ChatTransport, ChunkSink, TransportEvent, TransportEventKind, request_stop, start_streaming,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Request sent, no content yet
    Requesting,
    /// At least one content event applied
    Streaming,
    Completed,
    Cancelled,
    Errored,
}

#[derive(Debug)]
pub struct StreamSession {
    pub id: String,
    pub state: SessionState,
    /// Assistant message this session fills
    pub target_message_id: String,
    decoder: FrameDecoder,
    abort: Arc<AtomicBool>,
    frames_seen: usize,
    fallback_reply: String,
}

/// How the last session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: String,
    pub state: SessionState,
    pub dropped_frames: usize,
}

#[derive(Debug)]
struct PendingFallback {
    due: Instant,
    reply: String,
}

#[derive(Debug)]
pub struct SessionManager {
    active: Option<StreamSession>,
    fallback: Option<PendingFallback>,
    fallback_delay: Duration,
    last_outcome: Option<SessionOutcome>,
}

/// Locally generated reply shown when the backend is unreachable.
pub fn fallback_reply(payload: &OutboundMessage, model: &str) -> String {
    let attachments = match payload.attachments.len() {
        0 => String::new(),
        1 => " with 1 attachment".to_string(),
        n => format!(" with {} attachments", n),
    };
    format!(
        "{} The chat service could not be reached, so this reply was generated locally and not by {}. \
         You sent: \"{}\"{}. Try again once the connection is back.",
        FALLBACK_MARKER, model, payload.message, attachments
    )
}

impl SessionManager {
    pub fn new(fallback_delay: Duration) -> Self {
        Self { active: None, fallback: None, fallback_delay, last_outcome: None }
    }

    pub fn active(&self) -> Option<&StreamSession> {
        self.active.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&SessionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Waiting for the first content (or for the fallback reply).
    pub fn is_loading(&self) -> bool {
        self.fallback.is_some() || self.active.as_ref().is_some_and(|s| s.state == SessionState::Requesting)
    }

    /// A session or a pending fallback exists; send acts as stop.
    pub fn is_busy(&self) -> bool {
        self.active.is_some() || self.fallback.is_some()
    }

    pub fn fallback_pending(&self) -> bool {
        self.fallback.is_some()
    }

    /// Open a new session for `payload`. Any active session is cancelled
    /// first. Returns the new session id.
    pub fn start(
        &mut self,
        payload: &OutboundMessage,
        model: &str,
        conversation: &mut Conversation,
        transport: &Arc<dyn ChatTransport>,
        tx: &Sender<TransportEvent>,
    ) -> String {
        self.cancel(conversation, transport);

        let id = uuid::Uuid::new_v4().to_string();
        let target_message_id = conversation.push_assistant();
        let abort = Arc::new(AtomicBool::new(false));

        let request = ChatRequest {
            message: payload.message.clone(),
            attachments: payload.attachments.clone(),
            model: model.to_string(),
            stream_id: id.clone(),
            action: payload.action.clone(),
        };

        log::debug!("session {} requesting (target {})", id, target_message_id);
        self.active = Some(StreamSession {
            id: id.clone(),
            state: SessionState::Requesting,
            target_message_id,
            decoder: FrameDecoder::new(),
            abort: abort.clone(),
            frames_seen: 0,
            fallback_reply: fallback_reply(payload, model),
        });

        start_streaming(transport.clone(), request, ChunkSink::new(id.clone(), tx.clone(), abort));
        id
    }

    /// Stop the active session (or a pending fallback). Sends a best-effort
    /// stop request and ends the session locally without waiting for it.
    /// Returns false when there was nothing to cancel.
    pub fn cancel(&mut self, conversation: &mut Conversation, transport: &Arc<dyn ChatTransport>) -> bool {
        if let Some(session) = self.active.take() {
            request_stop(transport.clone(), session.id.clone());
            conversation.push_system(DEFAULT_CANCEL_NOTICE);
            self.finish(session, SessionState::Cancelled);
            return true;
        }
        if self.fallback.take().is_some() {
            conversation.push_system(DEFAULT_CANCEL_NOTICE);
            return true;
        }
        false
    }

    /// Apply one event from a transport worker.
    pub fn handle_transport(&mut self, event: TransportEvent, conversation: &mut Conversation, now: Instant) {
        let Some(session) = self.active.as_mut() else {
            log::debug!("ignoring transport event for inactive session {}", event.session_id);
            return;
        };
        if session.id != event.session_id {
            log::debug!("ignoring transport event for stale session {}", event.session_id);
            return;
        }

        match event.kind {
            TransportEventKind::Opened => {
                log::debug!("session {} stream opened", session.id);
            }
            TransportEventKind::Chunk(bytes) => {
                let events = session.decoder.push(&bytes);
                self.dispatch(events, conversation);
            }
            TransportEventKind::Closed => {
                let events = session.decoder.finish();
                self.dispatch(events, conversation);
                if let Some(session) = self.active.take() {
                    if session.frames_seen == 0 {
                        self.active = Some(session);
                        self.transport_failed("stream closed before any event", conversation, now);
                    } else {
                        log::warn!("session {} ended without a complete event", session.id);
                        self.finish(session, SessionState::Completed);
                    }
                }
            }
            TransportEventKind::Failed(err) => {
                self.transport_failed(&err.to_string(), conversation, now);
            }
        }
    }

    /// Show the fallback reply once its delay has passed.
    pub fn tick(&mut self, conversation: &mut Conversation, now: Instant) {
        if !self.fallback.as_ref().is_some_and(|f| now >= f.due) {
            return;
        }
        if let Some(fallback) = self.fallback.take() {
            conversation.push_assistant_text(fallback.reply);
        }
    }

    fn dispatch(&mut self, events: Vec<FrameEvent>, conversation: &mut Conversation) {
        for event in events {
            let Some(session) = self.active.as_mut() else {
                log::debug!("dropping frame after session end");
                return;
            };
            session.frames_seen += 1;

            match event {
                FrameEvent::Start { .. } => {}
                FrameEvent::Content { text } => {
                    if session.state == SessionState::Requesting {
                        session.state = SessionState::Streaming;
                        log::debug!("session {} streaming", session.id);
                    }
                    conversation.append_content(&session.target_message_id, &text);
                }
                FrameEvent::Complete { .. } => {
                    if let Some(session) = self.active.take() {
                        self.finish(session, SessionState::Completed);
                    }
                }
                FrameEvent::Cancelled { message } => {
                    conversation.push_system(message.unwrap_or_else(|| DEFAULT_CANCEL_NOTICE.to_string()));
                    if let Some(session) = self.active.take() {
                        self.finish(session, SessionState::Cancelled);
                    }
                }
                FrameEvent::Error { message } => {
                    let message = message.unwrap_or_else(|| "Unknown error".to_string());
                    conversation.push_system(format!("Error: {}", message));
                    if let Some(session) = self.active.take() {
                        self.finish(session, SessionState::Errored);
                    }
                }
            }
        }
    }

    /// The transport failed. Partial output is kept; if nothing was decoded
    /// the empty placeholder is removed and a fallback reply is scheduled.
    fn transport_failed(&mut self, reason: &str, conversation: &mut Conversation, now: Instant) {
        let Some(session) = self.active.take() else { return };
        log::warn!("session {} transport failure: {}", session.id, reason);
        conversation.push_system(format!("Connection error: {}", reason));

        if session.frames_seen == 0 {
            conversation.remove_if_empty(&session.target_message_id);
            self.fallback =
                Some(PendingFallback { due: now + self.fallback_delay, reply: session.fallback_reply.clone() });
        }
        self.finish(session, SessionState::Errored);
    }

    fn finish(&mut self, session: StreamSession, state: SessionState) {
        session.abort.store(true, Ordering::Relaxed);
        log::debug!("session {} {:?}", session.id, state);
        self.last_outcome =
            Some(SessionOutcome { session_id: session.id, state, dropped_frames: session.decoder.dropped_frames() });
    }
}
