use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::jobs::JobStore;
use crate::matches::MatchStore;
use crate::realtime::RealtimeManager;
use crate::resumes::ResumeStore;
use crate::session::Session;
use crate::subscription::{CheckoutProvider, HttpCheckoutProvider, SubscriptionService};
use crate::sync::spawn_watcher;

/// Composition root: the one place that owns the shared transport client,
/// the per-entity stores, the single realtime connection, and the watcher
/// lifecycle. Everything downstream receives handles from here.
pub struct ConsoleState {
    pub config: Config,
    pub session: Session,
    pub client: BackendClient,
    pub resumes: Arc<ResumeStore>,
    pub jobs: Arc<JobStore>,
    pub matches: Arc<MatchStore>,
    pub realtime: Arc<RealtimeManager>,
    pub subscription: SubscriptionService,
    watchers: CancellationToken,
}

impl ConsoleState {
    pub fn new(config: Config, session: Session) -> Self {
        let client = BackendClient::new(&config);
        let provider: Arc<dyn CheckoutProvider> = Arc::new(HttpCheckoutProvider::from_config(&config));
        ConsoleState {
            resumes: ResumeStore::new(client.clone()),
            jobs: JobStore::new(client.clone(), config.inferred_min_importance),
            matches: MatchStore::new(client.clone()),
            realtime: Arc::new(RealtimeManager::from_config(&config, &session)),
            subscription: SubscriptionService::new(
                client.clone(),
                provider,
                config.app_base_url.clone(),
            ),
            client,
            config,
            session,
            watchers: CancellationToken::new(),
        }
    }

    /// Bring the data plane up: connect the realtime channel and spawn one
    /// watcher per entity family. The returned handles finish on shutdown.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.realtime.start();
        let interval = self.config.poll_interval;
        vec![
            spawn_watcher(
                Arc::clone(&self.resumes),
                Arc::clone(&self.realtime),
                self.session.clone(),
                interval,
                self.watchers.child_token(),
            ),
            spawn_watcher(
                Arc::clone(&self.jobs),
                Arc::clone(&self.realtime),
                self.session.clone(),
                interval,
                self.watchers.child_token(),
            ),
            spawn_watcher(
                Arc::clone(&self.matches),
                Arc::clone(&self.realtime),
                self.session.clone(),
                interval,
                self.watchers.child_token(),
            ),
        ]
    }

    /// Explicit teardown (logout / process exit): stop the watchers and
    /// close the realtime connection. Nothing else ever disconnects it.
    pub fn shutdown(&self) {
        self.watchers.cancel();
        self.realtime.shutdown();
    }
}
