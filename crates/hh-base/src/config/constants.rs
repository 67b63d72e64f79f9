// =============================================================================
// ENDPOINTS
// =============================================================================

/// Base URL of the chat backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// File suggestions endpoint (`@` trigger), relative to the base URL
pub const DEFAULT_FILES_PATH: &str = "/files";

/// Action suggestions endpoint (`/` trigger), relative to the base URL
pub const DEFAULT_ACTIONS_PATH: &str = "/actions";

/// Streaming chat endpoint
pub const DEFAULT_STREAM_PATH: &str = "/chat/stream";

/// Stop endpoint for an in-flight stream
pub const DEFAULT_STOP_PATH: &str = "/chat/stop";

/// Model identifier sent when none is chosen
pub const DEFAULT_MODEL: &str = "claude-4-sonnet";

// =============================================================================
// TIMING
// =============================================================================

/// Delay before the offline fallback reply appears
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 2000;

/// Timeout for suggestion lookups and stop requests (the chat stream has none)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// A chat stream that delivers no bytes for this long is treated as broken
pub const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// COMPOSER
// =============================================================================

/// Maximum visual lines the composer grows to before it scrolls
pub const DEFAULT_MAX_INPUT_LINES: u16 = 8;

// =============================================================================
// STREAM
// =============================================================================

/// Prefix every frame line carries
pub const FRAME_PREFIX: &str = "data: ";

/// System notice when a stream is cancelled without a server message
pub const DEFAULT_CANCEL_NOTICE: &str = "Generation stopped by user.";

/// Marker at the start of every locally generated fallback reply
pub const FALLBACK_MARKER: &str = "[offline fallback]";

// =============================================================================
// FILES & ENV
// =============================================================================

/// Config file looked up relative to the working directory
pub const CONFIG_FILE: &str = ".hyperhint/config.yaml";

pub const ENV_BASE_URL: &str = "HYPERHINT_BASE_URL";
pub const ENV_MODEL: &str = "HYPERHINT_MODEL";
