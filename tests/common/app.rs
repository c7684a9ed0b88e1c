use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use exam_prep_backend::config::{
    CatalogueConfig, Config, ExamEnvConfig, RateLimitConfig, WorkerConfig,
};
use exam_prep_backend::exam::ExamConfig;
use exam_prep_backend::routes::build_router;
use exam_prep_backend::state::AppState;
use exam_prep_backend::store::Store;

use super::fixtures::{CATEGORY_ID, INSTITUTE_ID};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        self.state.store()
    }
}

async fn spawn_with_limits(api_limit: u64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("exam-prep-test.sled");

    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        worker: WorkerConfig {
            is_leader: false,
            enable_xp_decay: false,
            xp_decay_cron: "0 0 3 * * *".to_string(),
        },
        catalogue: CatalogueConfig {
            default_institute_id: INSTITUTE_ID.to_string(),
            default_exam_category_id: CATEGORY_ID.to_string(),
        },
        exam: ExamEnvConfig {
            question_fetch_limit: 1000,
            chapter_fetch_limit: 100,
            response_fetch_limit: 10_000,
            recommendation_pool_size: 30,
        },
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let exam = ExamConfig::from_env(&config.exam);
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store, exam, &config, shutdown_tx);

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_limits(100).await
}

pub async fn spawn_test_server_with_limit(api_limit: u64) -> TestApp {
    spawn_with_limits(api_limit).await
}
