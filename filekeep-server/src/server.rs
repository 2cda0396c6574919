use crate::api::{create_router, AppState};
use crate::poller::Poller;
use filekeep_core::{ConfigSource, EngineConfig, Repository, SharedRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct FilekeepServer {
    config: Arc<dyn ConfigSource>,
    repository: SharedRepository,
    poller: Poller,
    shutdown: CancellationToken,
}

impl FilekeepServer {
    pub fn new(config: Arc<dyn ConfigSource>) -> anyhow::Result<Self> {
        let initial = config.load()?;
        let repository = Repository::open(&initial.target_path)?.shared();
        Ok(Self::with_repository(config, initial, repository))
    }

    pub fn with_repository(
        config: Arc<dyn ConfigSource>,
        initial: EngineConfig,
        repository: SharedRepository,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let poller = Poller::new(
            Arc::clone(&config),
            initial,
            Arc::clone(&repository),
            shutdown.clone(),
        );

        Self {
            config,
            repository,
            poller,
            shutdown,
        }
    }

    /// Cancelling this token stops both the poller and the API server.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let state = AppState {
            repository: self.repository,
            config: self.config,
            poll_state: self.poller.state(),
        };

        let app = create_router(state);
        let poller = tokio::spawn(self.poller.run(None));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let token = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        // the poller cancels the token itself when it hits a fatal error
        self.shutdown.cancel();
        poller.await??;

        info!("Server stopped");
        Ok(())
    }
}
