pub mod xp_decay;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::WorkerConfig;
use crate::exam::ExamConfig;
use crate::store::Store;

/// Timeout for individual worker invocations (5 minutes).
const WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    XpDecay,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XpDecay => "xp_decay",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: WorkerName,
    pub cron: String,
    pub enabled: bool,
}

pub struct WorkerManager {
    store: Arc<Store>,
    exam: Arc<ExamConfig>,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
}

impl WorkerManager {
    pub fn new(
        store: Arc<Store>,
        exam: Arc<ExamConfig>,
        shutdown_rx: broadcast::Receiver<()>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            store,
            exam,
            shutdown_rx,
            config: config.clone(),
        }
    }

    /// Single source of truth for all planned jobs and their cron schedules.
    pub fn planned_jobs(&self) -> Vec<JobSpec> {
        if !self.config.is_leader {
            return Vec::new();
        }

        vec![JobSpec {
            name: WorkerName::XpDecay,
            cron: self.config.xp_decay_cron.clone(),
            enabled: self.config.enable_xp_decay,
        }]
    }

    /// Start the worker scheduler. Returns an error if the scheduler cannot be created or started.
    pub async fn start(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.config.is_leader {
            tracing::info!("Worker leader disabled; skipping worker startup");
            return Ok(());
        }

        let mut scheduler = JobScheduler::new().await?;
        self.register_jobs(&scheduler).await;
        scheduler.start().await?;

        tracing::info!("Worker manager started");
        let _ = self.shutdown_rx.recv().await;

        tracing::info!(
            drain_ms = DRAIN_TIMEOUT.as_millis() as u64,
            "Worker manager shutting down"
        );
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        Ok(())
    }

    async fn register_jobs(&self, scheduler: &JobScheduler) {
        for spec in self.planned_jobs() {
            let name_str = spec.name.as_str();
            if !spec.enabled {
                tracing::info!(name = name_str, "Skipping disabled worker");
                continue;
            }

            let store = self.store.clone();
            let exam = self.exam.clone();

            let registered = match spec.name {
                WorkerName::XpDecay => {
                    add_job(scheduler, &spec.cron, name_str, move || {
                        let store = store.clone();
                        let exam = exam.clone();
                        async move {
                            xp_decay::run(&store, &exam.xp).await;
                        }
                    })
                    .await
                }
            };
            if registered {
                tracing::info!(name = name_str, cron = %spec.cron, "Registered worker");
            }
        }
    }
}

/// Add a job to the scheduler with an overlap guard and timeout wrapper.
async fn add_job<Fut, F>(
    scheduler: &JobScheduler,
    cron: &str,
    name: &'static str,
    mut run: F,
) -> bool
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(
                worker = name,
                "Skipping worker invocation: previous run still in progress"
            );
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            if tokio::time::timeout(WORKER_TIMEOUT, fut).await.is_err() {
                tracing::error!(
                    worker = name,
                    timeout_secs = WORKER_TIMEOUT.as_secs(),
                    "Worker timed out"
                );
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => match scheduler.add(job).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, cron, worker = name, "Failed to add worker job");
                false
            }
        },
        Err(err) => {
            tracing::error!(error = %err, cron, worker = name, "Failed to create worker job");
            false
        }
    }
}
