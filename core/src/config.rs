//! Client-wide settings shared by every request.

/// Remote host of the list service API.
pub const DEFAULT_BASE_URL: &str = "https://myanimelist.net/api/";

/// Fixed client identifier sent as `User-Agent`.
pub const DEFAULT_USER_AGENT: &str = concat!("mal-client/", env!("CARGO_PKG_VERSION"));

/// Immutable request defaults captured when a client is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
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
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
