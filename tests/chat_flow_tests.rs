//! End-to-end tests for the composer, autocomplete and streaming session
//! manager driven through `App` with fake collaborators.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use hh_base::config::Config;
use hh_base::config::constants::{DEFAULT_CANCEL_NOTICE, FALLBACK_MARKER};
use hh_base::state::{Role, Suggestion, TriggerKind};
use hyperhint::App;
use hyperhint::api::{ApiError, ChatRequest, ChatTransport, ChunkSink, SuggestionSource};
use hyperhint::app::SessionState;

/// Returns page.tsx for the query "rea" and nothing otherwise.
struct PageSuggestions;

impl SuggestionSource for PageSuggestions {
    fn fetch(&self, kind: TriggerKind, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        if kind == TriggerKind::File && query == "rea" {
            Ok(vec![Suggestion::new("4", "src/app/page.tsx").with_description("Main page component")])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Plays back fixed chunks, then ends the body.
struct Scripted {
    chunks: Vec<&'static str>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl Scripted {
    fn new(chunks: Vec<&'static str>) -> Self {
        Self { chunks, requests: Mutex::new(Vec::new()) }
    }
}

impl ChatTransport for Scripted {
    fn stream(&self, request: &ChatRequest, sink: &ChunkSink) -> Result<(), ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        sink.opened();
        for chunk in &self.chunks {
            if !sink.chunk(chunk.as_bytes().to_vec()) {
                break;
            }
        }
        Ok(())
    }

    fn stop(&self, _stream_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Rejects every stream immediately.
struct Unreachable;

impl ChatTransport for Unreachable {
    fn stream(&self, _request: &ChatRequest, _sink: &ChunkSink) -> Result<(), ApiError> {
        Err(ApiError::Network("connection refused".into()))
    }

    fn stop(&self, _stream_id: &str) -> Result<(), ApiError> {
        Err(ApiError::Network("connection refused".into()))
    }
}

/// Keeps the stream open until aborted; records stop requests.
#[derive(Default)]
struct Hanging {
    stops: Mutex<Vec<String>>,
}

impl ChatTransport for Hanging {
    fn stream(&self, _request: &ChatRequest, sink: &ChunkSink) -> Result<(), ApiError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !sink.is_aborted() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }

    fn stop(&self, stream_id: &str) -> Result<(), ApiError> {
        self.stops.lock().unwrap().push(stream_id.to_string());
        Ok(())
    }
}

fn config() -> Config {
    Config { fallback_delay_ms: 50, ..Config::default() }
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        assert!(app.handle_event(&key(KeyCode::Char(c))));
    }
}

/// Drain worker results until `done` holds or two seconds pass.
fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        app.process_pending();
        if done(app) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn system_messages(app: &App) -> Vec<String> {
    app.conversation.messages().iter().filter(|m| m.role == Role::System).map(|m| m.content.clone()).collect()
}

#[test]
fn test_file_suggestion_commit_on_enter() {
    let mut app = App::new(config(), Arc::new(PageSuggestions), Arc::new(Scripted::new(Vec::new())));

    type_text(&mut app, "fix the @rea");
    assert!(pump_until(&mut app, |a| a.autocomplete.open));
    assert_eq!(app.autocomplete.suggestions[0].description.as_deref(), Some("Main page component"));

    // Enter commits instead of sending
    assert!(app.handle_event(&key(KeyCode::Enter)));

    assert_eq!(app.composer.text, "fix the ");
    assert_eq!(app.composer.selected_files.len(), 1);
    assert_eq!(app.composer.selected_files[0].label, "src/app/page.tsx");
    assert!(!app.autocomplete.open);
    assert!(app.conversation.is_empty());
}

#[test]
fn test_submit_sends_chips_and_action() {
    let transport = Arc::new(Scripted::new(vec!["data: {\"type\":\"complete\"}\n"]));
    let mut app = App::new(config(), Arc::new(PageSuggestions), transport.clone());

    app.composer.add_selected_file(Suggestion::new("4", "src/app/page.tsx"));
    app.composer.set_action("generate-workflow");
    type_text(&mut app, "fix it");
    assert!(app.handle_event(&key(KeyCode::Enter)));
    assert!(pump_until(&mut app, |a| a.sessions.last_outcome().is_some()));

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "fix it");
    assert_eq!(requests[0].attachments[0].name, "src/app/page.tsx");
    assert_eq!(requests[0].action.as_deref(), Some("generate-workflow"));
    assert_eq!(requests[0].model, "claude-4-sonnet");
    assert!(app.composer.selected_files.is_empty());
}

#[test]
fn test_stream_split_mid_line_accumulates() {
    let transport = Scripted::new(vec![
        "data: {\"type\":\"start\"}\n\ndata: {\"type\":\"content\",\"content\":\"Hel\"}\n\ndata: {\"type\":\"con",
        "tent\",\"content\":\"lo\"}\n\n",
        "data: {\"type\":\"complete\"}\n\n",
    ]);
    let mut app = App::new(config(), Arc::new(PageSuggestions), Arc::new(transport));

    type_text(&mut app, "hi");
    app.submit();
    assert!(pump_until(&mut app, |a| a.sessions.last_outcome().is_some()));

    let outcome = app.sessions.last_outcome().unwrap();
    assert_eq!(outcome.state, SessionState::Completed);
    assert_eq!(outcome.dropped_frames, 0);

    let reply = app.conversation.last().unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "Hello");
    assert!(!app.is_loading());
    assert!(system_messages(&app).is_empty());
}

#[test]
fn test_unreachable_service_falls_back() {
    let mut app = App::new(config(), Arc::new(PageSuggestions), Arc::new(Unreachable));

    type_text(&mut app, "are you there?");
    app.submit();
    assert!(pump_until(&mut app, |a| !system_messages(a).is_empty()));
    assert_eq!(system_messages(&app), vec!["Connection error: Network error: connection refused"]);
    // Placeholder removed; fallback still pending
    assert_eq!(app.conversation.count_role(Role::Assistant), 0);
    assert!(app.is_loading());

    assert!(pump_until(&mut app, |a| a.conversation.count_role(Role::Assistant) == 1));
    let roles: Vec<Role> = app.conversation.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::System, Role::Assistant]);

    let reply = app.conversation.last().unwrap();
    assert!(reply.content.starts_with(FALLBACK_MARKER));
    assert!(reply.content.contains("are you there?"));
    assert!(!app.is_busy());
    assert_eq!(app.sessions.last_outcome().unwrap().state, SessionState::Errored);
}

#[test]
fn test_second_send_cancels_first_session() {
    let transport = Arc::new(Hanging::default());
    let mut app = App::new(config(), Arc::new(PageSuggestions), transport.clone());

    type_text(&mut app, "first");
    app.submit();
    let first = app.sessions.active().unwrap().id.clone();

    // Submit while busy stops; send() replaces directly
    let payload = hh_base::state::OutboundMessage { message: "second".into(), attachments: Vec::new(), action: None };
    let second = app.send(payload);

    assert_ne!(first, second);
    assert_eq!(app.sessions.active().unwrap().id, second);
    assert_eq!(app.sessions.last_outcome().unwrap().session_id, first);
    assert_eq!(app.sessions.last_outcome().unwrap().state, SessionState::Cancelled);
    assert_eq!(system_messages(&app), vec![DEFAULT_CANCEL_NOTICE]);

    let deadline = Instant::now() + Duration::from_secs(2);
    while transport.stops.lock().unwrap().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(*transport.stops.lock().unwrap(), vec![first]);

    app.stop();
}

#[test]
fn test_cancel_twice_adds_one_notice() {
    let mut app = App::new(config(), Arc::new(PageSuggestions), Arc::new(Hanging::default()));

    type_text(&mut app, "long task");
    app.submit();
    assert!(app.handle_event(&key(KeyCode::Esc)));
    assert!(!app.stop());

    // The aborted worker's close event must not touch anything
    thread::sleep(Duration::from_millis(50));
    app.process_pending();

    assert_eq!(system_messages(&app), vec![DEFAULT_CANCEL_NOTICE]);
    assert!(!app.is_busy());
    assert_eq!(app.conversation.messages()[1].content, "");
}

#[test]
fn test_failed_stop_request_still_cancels_locally() {
    let mut app = App::new(config(), Arc::new(PageSuggestions), Arc::new(Unreachable));

    type_text(&mut app, "hello");
    app.submit();
    // Cancel before the failure event is processed
    assert!(app.stop());
    thread::sleep(Duration::from_millis(50));
    app.process_pending();

    assert_eq!(system_messages(&app), vec![DEFAULT_CANCEL_NOTICE]);
    assert!(!app.sessions.fallback_pending());
}
