//! Chat front-end core: inline `@`/`/` autocomplete over a composer, and a
//! streaming session manager that fills assistant messages from a
//! newline-delimited event stream.

pub mod api;
pub mod app;

pub use app::App;
