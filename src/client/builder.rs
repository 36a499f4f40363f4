// ABOUTME: Convenience constructors layering ClientConfig overrides onto Client::connect
// ABOUTME: Use Client::connect directly when no overrides are needed

use crate::client::default::Client;
use crate::config::ClientConfig;
use crate::error::RemotingResult;

/// Builder for configuring and connecting a [`Client`] without assembling a
/// [`ClientConfig`] by hand.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder::default()
    }

    pub fn with_scanner_period_ms(mut self, period_ms: u64) -> Self {
        self.config = self.config.with_scanner_period_ms(period_ms);
        self
    }

    pub fn with_scanner_initial_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config = self.config.with_scanner_initial_delay_ms(delay_ms);
        self
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.config = self.config.with_max_frame_bytes(max_frame_bytes);
        self
    }

    /// Connect with whatever configuration has been built up so far.
    pub async fn connect(self, address: impl Into<String>) -> RemotingResult<Client> {
        Client::connect(address, self.config).await
    }
}
