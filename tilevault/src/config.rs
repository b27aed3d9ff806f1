//! Download configuration.

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent for tile requests. Some tile servers reject
/// requests without one.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Configuration for the HTTP side of a materialization run.
///
/// The in-flight pool width is intentionally not here: it is a fixed
/// property of the engine (see [`crate::orchestrator::MAX_IN_FLIGHT`]),
/// not an input-sized knob.
///
/// # Example
///
/// ```
/// use tilevault::config::DownloadConfig;
///
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout_secs(), 30);
///
/// let config = DownloadConfig::new().with_timeout_secs(60);
/// assert_eq!(config.timeout_secs(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Per-request timeout in seconds.
    timeout_secs: u64,
    /// User-Agent header value.
    user_agent: String,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout in seconds. Default: 30.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
