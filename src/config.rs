//! Connection settings for the remote platform.
//!
//! Read once at start, from CLI flags with environment fallbacks:
//! - `DOCBRIDGE_URL` - Platform base URL (default: `http://localhost:8087`)
//! - `DOCBRIDGE_WORKSPACE` - Workspace identifier
//! - `DOCBRIDGE_TOKEN` - Bearer token (preferred)
//! - `DOCBRIDGE_EMAIL` / `DOCBRIDGE_PASSWORD` - Login pair used when no token is set
//! - `DOCBRIDGE_CONNECT_TIMEOUT_MS` - Connection timeout (default: 30000)

use std::time::Duration;

use clap::Args;

use crate::platform::{ConnectOptions, ConnectionError, Credentials};

/// Default URL for a local platform deployment.
pub const DEFAULT_URL: &str = "http://localhost:8087";

/// Default connection timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub url: String,
    pub workspace: String,
    pub token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub connect_timeout: Duration,
}

impl PlatformConfig {
    /// Create with explicit url and workspace and no credentials.
    pub fn new(url: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            workspace: workspace.into(),
            token: None,
            email: None,
            password: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = non_empty(Some(token.into()));
        self
    }

    pub fn with_password(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = non_empty(Some(email.into()));
        self.password = non_empty(Some(password.into()));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load from environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| non_empty(std::env::var(name).ok());
        let connect_timeout = var("DOCBRIDGE_CONNECT_TIMEOUT_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);

        Self {
            url: var("DOCBRIDGE_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
            workspace: var("DOCBRIDGE_WORKSPACE").unwrap_or_default(),
            token: var("DOCBRIDGE_TOKEN"),
            email: var("DOCBRIDGE_EMAIL"),
            password: var("DOCBRIDGE_PASSWORD"),
            connect_timeout: Duration::from_millis(connect_timeout),
        }
    }

    /// Pick credentials: a token wins, otherwise both halves of the login pair
    /// must be present.
    pub fn credentials(&self) -> Result<Credentials, ConnectionError> {
        if let Some(token) = &self.token {
            return Ok(Credentials::Token(token.clone()));
        }
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Ok(Credentials::Password {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => Err(ConnectionError::MissingCredentials),
        }
    }

    pub fn connect_options(&self) -> Result<ConnectOptions, ConnectionError> {
        Ok(ConnectOptions {
            url: self.url.trim_end_matches('/').to_string(),
            workspace: self.workspace.clone(),
            credentials: self.credentials()?,
            timeout: self.connect_timeout,
        })
    }
}

/// CLI flags mirroring [`PlatformConfig`].
#[derive(Debug, Clone, Args)]
pub struct PlatformArgs {
    /// Platform base URL
    #[arg(long, env = "DOCBRIDGE_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Workspace identifier
    #[arg(long, env = "DOCBRIDGE_WORKSPACE")]
    pub workspace: String,

    /// Bearer token (preferred over email/password)
    #[arg(long, env = "DOCBRIDGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account email for password login
    #[arg(long, env = "DOCBRIDGE_EMAIL")]
    pub email: Option<String>,

    /// Account password for password login
    #[arg(long, env = "DOCBRIDGE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(long, env = "DOCBRIDGE_CONNECT_TIMEOUT_MS", default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
}

impl From<PlatformArgs> for PlatformConfig {
    fn from(args: PlatformArgs) -> Self {
        Self {
            url: args.url,
            workspace: args.workspace,
            token: non_empty(args.token),
            email: non_empty(args.email),
            password: non_empty(args.password),
            connect_timeout: Duration::from_millis(args.connect_timeout_ms),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
