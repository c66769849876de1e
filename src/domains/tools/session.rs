//! Per-registry session managers.
//!
//! A session manager is the background resource a registry owns for the
//! serving period. The host starts it before the registry receives any
//! request and stops it during shutdown. Each request holds a [`Session`]
//! for as long as it is being handled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use super::error::BoxError;

/// Errors raised by session managers.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session manager already started")]
    AlreadyStarted,

    #[error("Session manager already stopped")]
    AlreadyStopped,

    #[error("Session manager is not running")]
    NotRunning,

    /// In-flight requests did not finish before the drain timeout.
    #[error("{in_flight} session(s) still active after {timeout:?}")]
    DrainTimeout { in_flight: usize, timeout: Duration },

    /// Failure from a custom session manager implementation.
    #[error("Session backend error: {0}")]
    Backend(#[source] BoxError),
}

/// An admitted request. Dropping it releases the slot.
#[must_use = "a session is released as soon as it is dropped"]
#[derive(Debug)]
pub struct Session {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Session {
    /// A session that is not counted by any manager.
    pub fn untracked() -> Self {
        Self { _permit: None }
    }

    fn tracked(permit: OwnedSemaphorePermit) -> Self {
        Self {
            _permit: Some(permit),
        }
    }
}

/// Background resource with explicit start and stop.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Begin accepting sessions.
    async fn start(&self) -> Result<(), SessionError>;

    /// Stop accepting sessions and release the manager's resources.
    async fn stop(&self) -> Result<(), SessionError>;

    /// Admit one request, or `None` if the manager is not serving.
    fn open_session(&self) -> Option<Session>;
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Session manager for stateless HTTP serving.
///
/// No per-client state is kept between requests. The manager only gates
/// admission: requests are refused before `start` and after `stop`, at
/// most `capacity` run concurrently, and `stop` waits for the in-flight
/// ones to finish (bounded by `drain_timeout`).
pub struct StatelessSessionManager {
    registry: String,
    state: AtomicU8,
    permits: Arc<Semaphore>,
    capacity: u32,
    drain_timeout: Duration,
}

impl StatelessSessionManager {
    pub fn new(registry: impl Into<String>, capacity: u32, drain_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            registry: registry.into(),
            state: AtomicU8::new(IDLE),
            permits: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
            drain_timeout,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// Number of requests currently holding a session.
    pub fn active_sessions(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.permits.available_permits())
    }
}

#[async_trait]
impl SessionManager for StatelessSessionManager {
    async fn start(&self) -> Result<(), SessionError> {
        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                info!(registry = %self.registry, capacity = self.capacity, "Session manager started");
                Ok(())
            }
            Err(RUNNING) => Err(SessionError::AlreadyStarted),
            Err(_) => Err(SessionError::AlreadyStopped),
        }
    }

    async fn stop(&self) -> Result<(), SessionError> {
        match self
            .state
            .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(STOPPED) => return Err(SessionError::AlreadyStopped),
            Err(_) => return Err(SessionError::NotRunning),
        }

        let drained = tokio::time::timeout(
            self.drain_timeout,
            self.permits.clone().acquire_many_owned(self.capacity),
        )
        .await;

        match drained {
            Ok(_) => {
                self.permits.close();
                info!(registry = %self.registry, "Session manager stopped");
                Ok(())
            }
            Err(_) => {
                let in_flight = self.active_sessions();
                self.permits.close();
                warn!(registry = %self.registry, in_flight, "Session drain timed out");
                Err(SessionError::DrainTimeout {
                    in_flight,
                    timeout: self.drain_timeout,
                })
            }
        }
    }

    fn open_session(&self) -> Option<Session> {
        if !self.is_running() {
            return None;
        }
        self.permits
            .clone()
            .try_acquire_owned()
            .ok()
            .map(Session::tracked)
    }
}
