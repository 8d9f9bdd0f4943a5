//! Lifecycle of the single platform session.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use super::{Connector, RemoteError, Session};
use crate::config::PlatformConfig;

/// Connection lifecycle errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("No credentials configured: set a token or an email/password pair")]
    MissingCredentials,

    #[error("Failed to connect to platform: {0}")]
    RemoteConnectFailed(#[source] RemoteError),

    /// `client()` was called before `connect()`.
    #[error("Not connected to platform")]
    NotConnected,
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

enum State {
    Disconnected,
    Connecting,
    Connected(Session),
}

/// Owns at most one live session.
///
/// `connect()` is single-flight: attempts are serialized, and once a session
/// is cached every caller receives the same `Arc`.
pub struct Connection {
    config: PlatformConfig,
    connector: Arc<dyn Connector>,
    gate: Mutex<()>,
    state: RwLock<State>,
}

impl Connection {
    pub fn new(config: PlatformConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            gate: Mutex::new(()),
            state: RwLock::new(State::Disconnected),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Return the cached session, connecting first if needed.
    pub async fn connect(&self) -> Result<Session, ConnectionError> {
        if let Some(session) = self.cached() {
            return Ok(session);
        }

        let _guard = self.gate.lock().await;
        // Another caller may have connected while we waited.
        if let Some(session) = self.cached() {
            return Ok(session);
        }

        let options = self.config.connect_options()?;
        self.set_state(State::Connecting);
        let _reset = ConnectingReset(&self.state);
        tracing::info!(url = %options.url, workspace = %options.workspace, "Connecting to platform");

        match self.connector.connect(&options).await {
            Ok(session) => {
                self.set_state(State::Connected(session.clone()));
                tracing::info!("Connected to platform");
                Ok(session)
            }
            Err(e) => {
                self.set_state(State::Disconnected);
                tracing::warn!(error = %e, "Platform connection failed");
                Err(ConnectionError::RemoteConnectFailed(e))
            }
        }
    }

    /// Close the session if there is one. No-op when already disconnected.
    pub async fn disconnect(&self) {
        let _guard = self.gate.lock().await;
        let previous = {
            let mut state = self.state.write().expect("connection state lock poisoned");
            std::mem::replace(&mut *state, State::Disconnected)
        };

        if let State::Connected(session) = previous {
            if let Err(e) = session.close().await {
                tracing::warn!(error = %e, "Error closing platform session");
            }
            tracing::info!("Disconnected from platform");
        }
    }

    /// Return the cached session without connecting.
    pub fn client(&self) -> Result<Session, ConnectionError> {
        self.cached().ok_or_else(|| {
            tracing::error!("Platform session requested before connect()");
            ConnectionError::NotConnected
        })
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    pub fn status(&self) -> ConnectionStatus {
        match *self.state.read().expect("connection state lock poisoned") {
            State::Disconnected => ConnectionStatus::Disconnected,
            State::Connecting => ConnectionStatus::Connecting,
            State::Connected(_) => ConnectionStatus::Connected,
        }
    }

    /// Probe the session. False when disconnected, when the introspection
    /// call fails, or when it does not answer within `timeout`.
    pub async fn ping(&self, timeout: Duration) -> bool {
        let Some(session) = self.cached() else {
            return false;
        };

        match tokio::time::timeout(timeout, session.account()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Ping failed");
                false
            }
            Err(_) => {
                tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Ping timed out");
                false
            }
        }
    }

    fn cached(&self) -> Option<Session> {
        match &*self.state.read().expect("connection state lock poisoned") {
            State::Connected(session) => Some(session.clone()),
            _ => None,
        }
    }

    fn set_state(&self, next: State) {
        *self.state.write().expect("connection state lock poisoned") = next;
    }
}

/// Returns the state to `Disconnected` if a connect attempt is dropped while
/// still `Connecting`.
struct ConnectingReset<'a>(&'a RwLock<State>);

impl Drop for ConnectingReset<'_> {
    fn drop(&mut self) {
        let mut state = self.0.write().expect("connection state lock poisoned");
        if matches!(*state, State::Connecting) {
            tracing::debug!("Connect attempt cancelled");
            *state = State::Disconnected;
        }
    }
}
