use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub worker: WorkerConfig,
    pub catalogue: CatalogueConfig,
    pub exam: ExamEnvConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_xp_decay: bool,
    pub xp_decay_cron: String,
}

/// 目录级默认值：请求未指定时使用的机构与考试类别
#[derive(Debug, Clone)]
pub struct CatalogueConfig {
    pub default_institute_id: String,
    pub default_exam_category_id: String,
}

/// 引擎批量读取上限，见 `ExamConfig::from_env`
#[derive(Debug, Clone)]
pub struct ExamEnvConfig {
    pub question_fetch_limit: usize,
    pub chapter_fetch_limit: usize,
    pub response_fetch_limit: usize,
    pub recommendation_pool_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/exam-prep.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_xp_decay: env_or_bool("ENABLE_XP_DECAY_WORKER", true),
                xp_decay_cron: env_or("XP_DECAY_CRON", "0 0 3 * * *"),
            },
            catalogue: CatalogueConfig {
                default_institute_id: env_or("DEFAULT_INSTITUTE_ID", "default-institute"),
                default_exam_category_id: env_or("DEFAULT_EXAM_CATEGORY_ID", "default-category"),
            },
            exam: ExamEnvConfig {
                question_fetch_limit: env_or_parse("QUESTION_FETCH_LIMIT", 1000_usize),
                chapter_fetch_limit: env_or_parse("CHAPTER_FETCH_LIMIT", 100_usize),
                response_fetch_limit: env_or_parse("RESPONSE_FETCH_LIMIT", 10_000_usize),
                recommendation_pool_size: env_or_parse("RECOMMENDATION_POOL_SIZE", 30_usize),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
