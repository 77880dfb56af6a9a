use std::time::Duration;

/// Build the shared HTTP client for provider calls.
///
/// Only the connect phase is bounded here; the whole call is bounded by the
/// provider so that a slow reply surfaces as a timeout rather than a transport error.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeout_secs.clamp(1, 10)))
        .tcp_nodelay(true)
        .user_agent(concat!("photronic/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}
