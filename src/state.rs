use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::exam::ExamConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    exam: Arc<ExamConfig>,
    rate_limiter: Arc<RateLimiter>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        exam: ExamConfig,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit.window_secs,
            config.rate_limit.max_requests,
        ));

        Self {
            store,
            exam: Arc::new(exam),
            rate_limiter,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_arc(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    pub fn exam(&self) -> &ExamConfig {
        &self.exam
    }

    pub fn exam_arc(&self) -> Arc<ExamConfig> {
        Arc::clone(&self.exam)
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use super::*;

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(
            Store::open(tmp.path().join("state_shutdown.sled").to_str().unwrap()).unwrap(),
        );
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(store, ExamConfig::default(), &cfg, tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_store_and_exam_config() {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(Store::open(tmp.path().join("state_share.sled").to_str().unwrap()).unwrap());
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(store.clone(), ExamConfig::default(), &cfg, tx);
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.store_arc(), &cloned.store_arc()));
        assert!(Arc::ptr_eq(&state.exam_arc(), &cloned.exam_arc()));
        assert_eq!(cloned.exam().recommender.picks_per_topic, 3);
    }
}
