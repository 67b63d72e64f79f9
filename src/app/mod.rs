mod actions;
mod autocomplete;
pub mod events;
pub mod session;

pub use actions::Action;
pub use session::{SessionManager, SessionOutcome, SessionState};

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crossterm::event::Event;
use hh_base::config::Config;
use hh_base::state::{Attachment, AutocompleteState, Composer, Conversation, OutboundMessage, TriggerContext};

use crate::api::http::{HttpChatTransport, HttpSuggestionClient};
use crate::api::{ApiError, ChatTransport, SuggestionResult, SuggestionSource, TransportEvent};

/// Owns every piece of front-end state and applies all mutations on one
/// thread. Worker results arrive over channels and are drained by
/// `process_pending` / `tick_at`.
pub struct App {
    pub config: Config,
    /// Model identifier sent with each chat request
    pub model: String,
    pub composer: Composer,
    pub autocomplete: AutocompleteState,
    pub conversation: Conversation,
    pub sessions: SessionManager,
    /// `@` menu opened without a typed trigger (empty span at the caret)
    manual_trigger: Option<TriggerContext>,
    suggestion_source: Arc<dyn SuggestionSource>,
    transport: Arc<dyn ChatTransport>,
    suggestion_tx: Sender<SuggestionResult>,
    suggestion_rx: Receiver<SuggestionResult>,
    stream_tx: Sender<TransportEvent>,
    stream_rx: Receiver<TransportEvent>,
}

impl App {
    pub fn new(config: Config, suggestion_source: Arc<dyn SuggestionSource>, transport: Arc<dyn ChatTransport>) -> Self {
        let (suggestion_tx, suggestion_rx) = mpsc::channel();
        let (stream_tx, stream_rx) = mpsc::channel();
        Self {
            model: config.default_model.clone(),
            composer: Composer::new(config.max_input_lines),
            autocomplete: AutocompleteState::new(),
            conversation: Conversation::new(),
            sessions: SessionManager::new(config.fallback_delay()),
            manual_trigger: None,
            suggestion_source,
            transport,
            suggestion_tx,
            suggestion_rx,
            stream_tx,
            stream_rx,
            config,
        }
    }

    /// App wired to the HTTP backend described by `config`.
    pub fn with_http(config: Config) -> Result<Self, ApiError> {
        let suggestions = Arc::new(HttpSuggestionClient::new(&config)?);
        let transport = Arc::new(HttpChatTransport::new(&config)?);
        Ok(Self::new(config, suggestions, transport))
    }

    /// Map a terminal event and apply it. Returns false when the user asked to quit.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match events::handle_event(event, self) {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    /// Send button. Acts as stop while a request is in flight.
    pub fn submit(&mut self) {
        if self.sessions.is_busy() {
            self.stop();
            return;
        }
        if let Some(payload) = self.composer.take_payload() {
            self.send(payload);
        }
    }

    /// Record the user message and open a new stream for it.
    /// An active session is cancelled first.
    pub fn send(&mut self, payload: OutboundMessage) -> String {
        self.close_menu();
        self.sessions.cancel(&mut self.conversation, &self.transport);
        self.conversation.push_user(payload.message.clone(), payload.attachments.clone());
        self.sessions.start(&payload, &self.model, &mut self.conversation, &self.transport, &self.stream_tx)
    }

    /// Stop generation. Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        self.sessions.cancel(&mut self.conversation, &self.transport)
    }

    pub fn is_loading(&self) -> bool {
        self.sessions.is_loading()
    }

    pub fn is_busy(&self) -> bool {
        self.sessions.is_busy()
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Stage a locally picked file; images are recognised by MIME type.
    pub fn add_local_file(&mut self, name: impl Into<String>, mime: &str, source_ref: Option<String>) {
        self.composer.add_attachment(Attachment::from_pick(name, mime, source_ref));
    }

    /// Drain worker results and fire due timers.
    pub fn process_pending(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.process_suggestion_results();
        while let Ok(event) = self.stream_rx.try_recv() {
            self.sessions.handle_transport(event, &mut self.conversation, now);
        }
        self.sessions.tick(&mut self.conversation, now);
    }
}
