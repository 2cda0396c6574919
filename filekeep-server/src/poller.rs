use filekeep_core::{ConfigSource, EngineConfig, Repository, SharedRepository, StoreReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Idle,
    Scanning,
    Committing,
}

pub type SharedPollState = Arc<Mutex<PollState>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Inactive,
    Cancelled,
    NoChanges,
    Stored(StoreReport),
    Failed { reason: String },
}

type Binder = Box<dyn Fn(&Path) -> filekeep_core::Result<Repository> + Send + Sync>;

/// Drives scan + store on a timer, reloading its configuration every cycle.
pub struct Poller {
    config: Arc<dyn ConfigSource>,
    current: EngineConfig,
    repository: SharedRepository,
    bound_path: PathBuf,
    state: SharedPollState,
    cancel: CancellationToken,
    binder: Binder,
}

impl Poller {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        initial: EngineConfig,
        repository: SharedRepository,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            bound_path: initial.target_path.clone(),
            current: initial,
            repository,
            state: Arc::new(Mutex::new(PollState::Idle)),
            cancel,
            binder: Box::new(|path: &Path| Repository::open(path)),
        }
    }

    /// Replace how a changed target path is bound to a repository.
    pub fn with_binder<F>(mut self, binder: F) -> Self
    where
        F: Fn(&Path) -> filekeep_core::Result<Repository> + Send + Sync + 'static,
    {
        self.binder = Box::new(binder);
        self
    }

    pub fn state(&self) -> SharedPollState {
        Arc::clone(&self.state)
    }

    /// Run until cancelled. An unusable target directory stops the loop, and
    /// cancels the token so the rest of the daemon shuts down with it.
    pub async fn run(
        mut self,
        reports: Option<mpsc::UnboundedSender<CycleOutcome>>,
    ) -> filekeep_core::Result<()> {
        info!("Poller started for {:?}", self.bound_path);

        while !self.cancel.is_cancelled() {
            let interval = self.reload().interval();
            debug!("Next scan in {:?}", interval);

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let outcome = match self.cycle().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Poller stopped: {}", e);
                    self.cancel.cancel();
                    return Err(e);
                }
            };

            match &outcome {
                CycleOutcome::Stored(report) => info!(
                    "Stored {} change(s), {} left for next cycle",
                    report.committed.len(),
                    report.failed.len()
                ),
                CycleOutcome::Failed { reason } => warn!("Cycle failed: {}", reason),
                other => debug!("Cycle finished: {:?}", other),
            }

            if let Some(reports) = &reports {
                let _ = reports.send(outcome);
            }
        }

        info!("Poller stopped");
        Ok(())
    }

    /// One pass: reload config, rebind if the target moved, then scan and
    /// store. Backend failures are reported, not returned.
    pub async fn cycle(&mut self) -> filekeep_core::Result<CycleOutcome> {
        let config = self.reload();

        if config.target_path != self.bound_path {
            self.rebind(&config.target_path).await?;
        }
        if !config.active {
            return Ok(CycleOutcome::Inactive);
        }
        if self.cancel.is_cancelled() {
            return Ok(CycleOutcome::Cancelled);
        }

        let repository = Arc::clone(&self.repository);
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        set_state(&state, PollState::Scanning);

        let pass = tokio::task::spawn_blocking({
            let state = Arc::clone(&state);
            move || {
                let repository = repository.lock().unwrap();
                if !repository.has_changes()? {
                    return Ok(None);
                }
                set_state(&state, PollState::Committing);
                repository
                    .store_changes_until(&|| cancel.is_cancelled())
                    .map(Some)
            }
        })
        .await;
        set_state(&state, PollState::Idle);

        Ok(match pass {
            Ok(Ok(None)) => CycleOutcome::NoChanges,
            Ok(Ok(Some(report))) => CycleOutcome::Stored(report),
            Ok(Err(e)) => CycleOutcome::Failed {
                reason: e.to_string(),
            },
            Err(e) => CycleOutcome::Failed {
                reason: e.to_string(),
            },
        })
    }

    fn reload(&mut self) -> EngineConfig {
        match self.config.load() {
            Ok(config) => self.current = config,
            Err(e) => warn!("Keeping previous configuration: {}", e),
        }
        self.current.clone()
    }

    async fn rebind(&mut self, target: &Path) -> filekeep_core::Result<()> {
        info!("Target moved from {:?} to {:?}", self.bound_path, target);

        let repository = (self.binder)(target)?;
        let shared = Arc::clone(&self.repository);
        // wait for any in-flight engine call before swapping
        tokio::task::spawn_blocking(move || {
            *shared.lock().unwrap() = repository;
        })
        .await
        .map_err(|e| {
            filekeep_core::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;

        self.bound_path = target.to_path_buf();
        Ok(())
    }
}

fn set_state(state: &SharedPollState, next: PollState) {
    *state.lock().unwrap() = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekeep_core::{Error, MemoryConfig, ScriptedBackend};
    use std::time::Duration;
    use tempfile::TempDir;

    const STATUS: &str = "status --short --untracked-files=all";

    fn scripted() -> ScriptedBackend {
        ScriptedBackend::new().respond("rev-parse --is-inside-work-tree", "true\n")
    }

    fn poller_with(
        dir: &Path,
        backend: ScriptedBackend,
        config: EngineConfig,
    ) -> (Poller, Arc<MemoryConfig>, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let repository = Repository::with_backend(dir, Arc::clone(&backend))
            .unwrap()
            .shared();
        let source = Arc::new(MemoryConfig::new(config.clone()));
        let poller = Poller::new(source.clone(), config, repository, CancellationToken::new());
        (poller, source, backend)
    }

    #[tokio::test]
    async fn test_inactive_cycle_skips_backend() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path()).with_active(false);
        let (mut poller, _, backend) = poller_with(temp_dir.path(), scripted(), config);

        assert_eq!(poller.cycle().await.unwrap(), CycleOutcome::Inactive);
        assert!(!backend.calls().iter().any(|c| c.starts_with("status")));
    }

    #[tokio::test]
    async fn test_no_changes_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (mut poller, _, backend) =
            poller_with(temp_dir.path(), scripted().respond(STATUS, ""), config);

        assert_eq!(poller.cycle().await.unwrap(), CycleOutcome::NoChanges);
        assert!(!backend.calls().iter().any(|c| c.starts_with("commit")));
        assert_eq!(*poller.state().lock().unwrap(), PollState::Idle);
    }

    #[tokio::test]
    async fn test_changes_are_stored() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (mut poller, _, _) =
            poller_with(temp_dir.path(), scripted().respond(STATUS, " M notes.txt\n"), config);

        match poller.cycle().await.unwrap() {
            CycleOutcome::Stored(report) => assert_eq!(report.committed, vec!["notes.txt"]),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (mut poller, _, _) =
            poller_with(temp_dir.path(), scripted().fail(STATUS, "fatal: index corrupt"), config);

        assert!(matches!(
            poller.cycle().await.unwrap(),
            CycleOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_active_flag_is_hot_reloaded() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (mut poller, source, _) =
            poller_with(temp_dir.path(), scripted().respond(STATUS, ""), config);

        assert_eq!(poller.cycle().await.unwrap(), CycleOutcome::NoChanges);
        source.update(|config| config.active = false);
        assert_eq!(poller.cycle().await.unwrap(), CycleOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_rebind_to_invalid_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (poller, source, _) = poller_with(temp_dir.path(), scripted(), config);
        let mut poller =
            poller.with_binder(|path: &Path| Err(Error::InvalidDirectory(path.to_path_buf())));

        source.update(|config| config.target_path = elsewhere.path().to_path_buf());

        assert!(matches!(
            poller.cycle().await,
            Err(Error::InvalidDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_rebind_swaps_repository() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path());
        let (poller, source, _) =
            poller_with(temp_dir.path(), scripted().respond(STATUS, ""), config);
        let next = Arc::new(scripted().respond(STATUS, ""));
        let binder_backend = Arc::clone(&next);
        let mut poller = poller.with_binder(move |path: &Path| {
            Repository::with_backend(path, Arc::clone(&binder_backend))
        });
        let repository = Arc::clone(&poller.repository);

        source.update(|config| config.target_path = elsewhere.path().to_path_buf());

        assert_eq!(poller.cycle().await.unwrap(), CycleOutcome::NoChanges);
        assert_eq!(
            repository.lock().unwrap().workdir(),
            elsewhere.path().canonicalize().unwrap()
        );
        assert!(next.calls().iter().any(|c| c == STATUS));
    }

    #[tokio::test]
    async fn test_run_stops_promptly_when_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path()).with_interval_secs(3600);
        let (poller, _, _) = poller_with(temp_dir.path(), scripted(), config);
        let cancel = poller.cancel.clone();

        let handle = tokio::spawn(poller.run(None));
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn test_run_reports_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::new(temp_dir.path()).with_interval_secs(1);
        let (poller, _, _) = poller_with(temp_dir.path(), scripted().respond(STATUS, ""), config);
        let cancel = poller.cancel.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(poller.run(Some(tx)));
        let outcome = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        cancel.cancel();

        assert_eq!(outcome.unwrap(), Some(CycleOutcome::NoChanges));
        assert!(handle.await.unwrap().is_ok());
    }
}
