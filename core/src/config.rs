//! Transport configuration.

use std::time::Duration;

/// Settings for the HTTP transport backing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connect timeout. `None` waits as long as the OS allows.
    pub timeout_connect: Option<Duration>,

    /// Deadline for the whole exchange, from connect to last body byte.
    pub timeout_global: Option<Duration>,

    /// User agent string.
    pub user_agent: String,
}

impl ClientConfig {
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub const ENV_CONNECT_TIMEOUT: &'static str = "BEEHIVE_CONNECT_TIMEOUT_SECS";
    pub const ENV_TIMEOUT: &'static str = "BEEHIVE_TIMEOUT_SECS";
    pub const ENV_USER_AGENT: &'static str = "BEEHIVE_USER_AGENT";

    /// Reads overrides from the environment on top of the defaults.
    ///
    /// Unparseable timeout values are ignored. A value of `0` disables the
    /// corresponding timeout.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(secs) = lookup(Self::ENV_CONNECT_TIMEOUT).and_then(|v| v.trim().parse().ok()) {
            config.timeout_connect = non_zero_secs(secs);
        }
        if let Some(secs) = lookup(Self::ENV_TIMEOUT).and_then(|v| v.trim().parse().ok()) {
            config.timeout_global = non_zero_secs(secs);
        }
        if let Some(agent) = lookup(Self::ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }
        config
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_connect = Some(timeout);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_global = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_connect: Some(Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS)),
            timeout_global: Some(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS)),
            user_agent: format!("beehive-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
