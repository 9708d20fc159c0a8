use nr_core::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// How requests identify the caller. A deployment uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` whenever a token is stored
    Token,
    /// `X-Client-Id: <generated id>` on every request
    #[default]
    Anonymous,
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "token" | "bearer" => Ok(AuthMode::Token),
            "anonymous" | "client-id" => Ok(AuthMode::Anonymous),
            other => Err(Error::Config(format!(
                "Unknown auth mode '{}'. Available: token, anonymous",
                other
            ))),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token => write!(f, "token"),
            AuthMode::Anonymous => write!(f, "anonymous"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub page_size: u32,
    pub auth: AuthMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            auth: AuthMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!("Unsupported URL scheme: {}", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", url)));
        }
        self.base_url = parsed;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::Config("page size must be at least 1".to_string()));
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}
