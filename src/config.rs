// ABOUTME: Configuration knobs for the client and server engines, all optional with defaults
// ABOUTME: Builder-style `with_*` setters mirror the teacher's ClientOptions pattern

use crate::codec::DEFAULT_MAX_FRAME_BYTES;

/// Client-side configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Period between timeout-sweeper ticks.
    pub scanner_period_ms: u64,
    /// Delay before the first sweeper tick after connect.
    pub scanner_initial_delay_ms: u64,
    /// Cap on a single frame body; exceeding it closes the connection.
    pub max_frame_bytes: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            scanner_period_ms: 1_000,
            scanner_initial_delay_ms: 3_000,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scanner_period_ms(mut self, period_ms: u64) -> Self {
        self.scanner_period_ms = period_ms;
        self
    }

    pub fn with_scanner_initial_delay_ms(mut self, delay_ms: u64) -> Self {
        self.scanner_initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }
}

/// Server-side configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP `listen` backlog.
    pub listen_backlog: u32,
    /// Period between liveness checks of accepted connections.
    pub liveness_period_ms: u64,
    /// Cap on a single frame body; exceeding it closes the connection.
    pub max_frame_bytes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_backlog: 1024,
            liveness_period_ms: 3_000,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listen_backlog(mut self, backlog: u32) -> Self {
        self.listen_backlog = backlog;
        self
    }

    pub fn with_liveness_period_ms(mut self, period_ms: u64) -> Self {
        self.liveness_period_ms = period_ms;
        self
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }
}
