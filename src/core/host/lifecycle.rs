//! Lifecycle coordination for registry session managers.
//!
//! [`LifecycleScope`] brackets the serving period: entering it starts every
//! session manager in mount order, exiting it stops them in reverse order.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::{HostError, ShutdownIssue};
use crate::domains::tools::SessionManager;

/// A session manager paired with the name of the registry that owns it.
#[derive(Clone)]
pub struct ManagedSessions {
    pub registry: String,
    pub manager: Arc<dyn SessionManager>,
}

impl ManagedSessions {
    pub fn new(registry: impl Into<String>, manager: Arc<dyn SessionManager>) -> Self {
        Self {
            registry: registry.into(),
            manager,
        }
    }
}

/// The set of started session managers.
///
/// Must be closed with [`LifecycleScope::exit`]; dropping it without doing
/// so leaves the managers running and is logged.
#[must_use = "a lifecycle scope must be exited to stop its session managers"]
pub struct LifecycleScope {
    started: Vec<ManagedSessions>,
}

impl LifecycleScope {
    /// Start every manager in order.
    ///
    /// If one fails, the managers already started are stopped in reverse
    /// order before the failure is returned.
    pub async fn enter(
        managers: impl IntoIterator<Item = ManagedSessions>,
    ) -> Result<Self, HostError> {
        let mut scope = Self {
            started: Vec::new(),
        };

        for entry in managers {
            info!(registry = %entry.registry, "Starting session manager");
            if let Err(source) = entry.manager.start().await {
                error!(registry = %entry.registry, "Session manager failed to start: {}", source);
                let rollback = scope.unwind().await;
                return Err(HostError::StartupFailure {
                    registry: entry.registry,
                    source,
                    rollback,
                });
            }
            scope.started.push(entry);
        }

        Ok(scope)
    }

    /// Names of the registries whose managers are running, in start order.
    pub fn started(&self) -> impl Iterator<Item = &str> {
        self.started.iter().map(|e| e.registry.as_str())
    }

    /// Stop every started manager in reverse order.
    ///
    /// All managers are attempted; failures are collected and returned
    /// together.
    pub async fn exit(mut self) -> Result<(), HostError> {
        let issues = self.unwind().await;
        if issues.is_empty() {
            Ok(())
        } else {
            Err(HostError::ShutdownFailure(issues))
        }
    }

    async fn unwind(&mut self) -> Vec<ShutdownIssue> {
        let mut issues = Vec::new();
        while let Some(entry) = self.started.pop() {
            info!(registry = %entry.registry, "Stopping session manager");
            if let Err(e) = entry.manager.stop().await {
                warn!(registry = %entry.registry, "Session manager failed to stop: {}", e);
                issues.push(ShutdownIssue {
                    registry: entry.registry,
                    error: e,
                });
            }
        }
        issues
    }
}

impl Drop for LifecycleScope {
    fn drop(&mut self) {
        if !self.started.is_empty() {
            let leaked: Vec<_> = self.started().collect();
            warn!(?leaked, "Lifecycle scope dropped without exit; session managers left running");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domains::tools::{Session, SessionError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Session manager that records start/stop calls into a shared journal.
    pub(crate) struct RecordingManager {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
        fail_stop: bool,
    }

    impl RecordingManager {
        pub(crate) fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                journal: journal.clone(),
                fail_start: false,
                fail_stop: false,
            }
        }

        pub(crate) fn failing_start(mut self) -> Self {
            self.fail_start = true;
            self
        }

        pub(crate) fn failing_stop(mut self) -> Self {
            self.fail_stop = true;
            self
        }

        pub(crate) fn into_entry(self) -> ManagedSessions {
            ManagedSessions::new(self.name, Arc::new(self))
        }
    }

    #[async_trait]
    impl SessionManager for RecordingManager {
        async fn start(&self) -> Result<(), SessionError> {
            self.journal.lock().unwrap().push(format!("start {}", self.name));
            if self.fail_start {
                return Err(SessionError::Backend("start refused".into()));
            }
            Ok(())
        }

        async fn stop(&self) -> Result<(), SessionError> {
            self.journal.lock().unwrap().push(format!("stop {}", self.name));
            if self.fail_stop {
                return Err(SessionError::Backend("stop refused".into()));
            }
            Ok(())
        }

        fn open_session(&self) -> Option<Session> {
            Some(Session::untracked())
        }
    }

    fn journal() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(journal: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_starts_in_order_and_stops_in_reverse() {
        let log = journal();
        let scope = LifecycleScope::enter(vec![
            RecordingManager::new("echo", &log).into_entry(),
            RecordingManager::new("math", &log).into_entry(),
        ])
        .await
        .unwrap();

        assert_eq!(scope.started().collect::<Vec<_>>(), vec!["echo", "math"]);
        scope.exit().await.unwrap();

        assert_eq!(
            entries(&log),
            vec!["start echo", "start math", "stop math", "stop echo"]
        );
    }

    #[tokio::test]
    async fn test_startup_failure_rolls_back_started_managers() {
        let log = journal();
        let result = LifecycleScope::enter(vec![
            RecordingManager::new("echo", &log).into_entry(),
            RecordingManager::new("math", &log).failing_start().into_entry(),
            RecordingManager::new("search", &log).into_entry(),
        ])
        .await;

        match result {
            Err(HostError::StartupFailure {
                registry, rollback, ..
            }) => {
                assert_eq!(registry, "math");
                assert!(rollback.is_empty());
            }
            Err(other) => panic!("expected startup failure, got {}", other),
            Ok(_) => panic!("expected startup failure"),
        }

        // The failed manager is not stopped; later ones are never started.
        assert_eq!(entries(&log), vec!["start echo", "start math", "stop echo"]);
    }

    #[tokio::test]
    async fn test_startup_failure_reports_rollback_errors() {
        let log = journal();
        let result = LifecycleScope::enter(vec![
            RecordingManager::new("echo", &log).failing_stop().into_entry(),
            RecordingManager::new("math", &log).failing_start().into_entry(),
        ])
        .await;

        match result {
            Err(HostError::StartupFailure { rollback, .. }) => {
                assert_eq!(rollback.len(), 1);
                assert_eq!(rollback[0].registry, "echo");
            }
            _ => panic!("expected startup failure"),
        }
    }

    #[tokio::test]
    async fn test_exit_attempts_every_manager_and_collects_errors() {
        let log = journal();
        let scope = LifecycleScope::enter(vec![
            RecordingManager::new("echo", &log).failing_stop().into_entry(),
            RecordingManager::new("math", &log).into_entry(),
            RecordingManager::new("search", &log).failing_stop().into_entry(),
        ])
        .await
        .unwrap();

        let err = scope.exit().await.unwrap_err();
        match err {
            HostError::ShutdownFailure(issues) => {
                let names: Vec<_> = issues.iter().map(|i| i.registry.as_str()).collect();
                assert_eq!(names, vec!["search", "echo"]);
            }
            other => panic!("expected shutdown failure, got {}", other),
        }

        assert_eq!(
            entries(&log)[3..],
            ["stop search", "stop math", "stop echo"]
        );
    }

    #[tokio::test]
    async fn test_empty_scope() {
        let scope = LifecycleScope::enter(Vec::new()).await.unwrap();
        assert_eq!(scope.started().count(), 0);
        scope.exit().await.unwrap();
    }
}
