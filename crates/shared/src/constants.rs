pub const APP_NAME: &str = "Courier";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;

// Text shown in place of a message removed for everyone
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted";

// Push channel (SSE)
pub const SSE_KEEPALIVE_INTERVAL_MS: u64 = 15_000;
pub const SSE_RECONNECT_BASE_DELAY_MS: u64 = 1_000;
pub const SSE_RECONNECT_MAX_DELAY_MS: u64 = 30_000;

// Polling fallback
pub const RECENT_POLL_INTERVAL_MS: u64 = 2_000;
