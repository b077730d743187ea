// ABOUTME: Session configuration with defaults for a local console and environment overrides
// ABOUTME: Provides fluent setters in the same style as the other config types

use crate::client::error::{JcliError, JcliResult};
use crate::expect::Prompts;
use std::env;
use std::time::Duration;

/// Console login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Everything needed to open one console session
///
/// # Example
///
/// ```rust
/// use jcli::client::SessionConfig;
/// use std::time::Duration;
///
/// // Console on localhost:8990 with the stock credentials
/// let config = SessionConfig::default();
///
/// let config = SessionConfig::new("10.0.0.5", 8990)
///     .with_credentials("admin", "s3cret")
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.address(), "10.0.0.5:8990");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,

    /// Upper bound for every read waiting on a prompt (default: 10 seconds)
    pub timeout: Duration,

    /// Upper bound for the TCP connect (default: 10 seconds)
    pub connect_timeout: Duration,

    pub prompts: Prompts,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8990,
            credentials: Credentials::new("jcliadmin", "jclipwd"),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            prompts: Prompts::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Defaults overridden by `JCLI_HOST`, `JCLI_PORT`, `JCLI_USERNAME`,
    /// `JCLI_PASSWORD` and `JCLI_TIMEOUT` (seconds)
    pub fn from_env() -> JcliResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JcliResult<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("JCLI_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("JCLI_PORT") {
            config.port = port
                .parse()
                .map_err(|_| JcliError::InvalidConfig(format!("JCLI_PORT: {port}")))?;
        }
        if let Some(username) = lookup("JCLI_USERNAME") {
            config.credentials.username = username;
        }
        if let Some(password) = lookup("JCLI_PASSWORD") {
            config.credentials.password = password;
        }
        if let Some(timeout) = lookup("JCLI_TIMEOUT") {
            let secs: u64 = timeout
                .parse()
                .map_err(|_| JcliError::InvalidConfig(format!("JCLI_TIMEOUT: {timeout}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_prompts(mut self, standard: impl Into<String>, interactive: impl Into<String>) -> Self {
        self.prompts = Prompts {
            standard: standard.into(),
            interactive: interactive.into(),
        };
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
