use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use tokio::sync::{broadcast, Mutex};

use crate::response::AppError;
use crate::state::AppState;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u64,
    window_start: Instant,
}

/// 按客户端 IP 的固定窗口限流
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window_secs: u64,
    max_requests: u64,
    entries: Arc<Mutex<HashMap<IpAddr, WindowEntry>>>,
}

#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Unix seconds at which the current window ends.
    pub reset_at: u64,
}

impl RateLimiter {
    pub fn new(window_secs: u64, max_requests: u64) -> Self {
        Self {
            window_secs,
            max_requests,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        let now = Instant::now();
        let mut map = self.entries.lock().await;

        let entry = map.entry(ip).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });
        if now.duration_since(entry.window_start).as_secs() >= self.window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }

        let elapsed = now.duration_since(entry.window_start).as_secs();
        let reset_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            + self.window_secs.saturating_sub(elapsed);

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_at,
        }
    }

    /// 清理已过期两个窗口以上的条目
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut map = self.entries.lock().await;
        let before = map.len();
        map.retain(|_, value| {
            now.duration_since(value.window_start).as_secs() <= self.window_secs * 2
        });
        before - map.len()
    }
}

/// Mounted on the `/api` router only; nested routers see the path without the prefix.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(req.headers(), state.config().trust_proxy);
    let limiter = state.rate_limiter();
    let decision = limiter.check(ip).await;

    if !decision.allowed {
        tracing::warn!(ip = %ip, "Rate limit exceeded");
        let mut response = AppError::too_many_requests("Too many requests").into_response();
        apply_rate_limit_headers(&mut response, &decision);
        if let Ok(v) = limiter.window_secs().to_string().parse() {
            response.headers_mut().insert("retry-after", v);
        }
        return response;
    }

    let mut response = next.run(req).await;
    apply_rate_limit_headers(&mut response, &decision);
    response
}

fn apply_rate_limit_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    for (name, value) in [
        ("ratelimit-limit", decision.limit),
        ("ratelimit-remaining", decision.remaining),
        ("ratelimit-reset", decision.reset_at),
    ] {
        if let Ok(v) = value.to_string().parse() {
            headers.insert(name, v);
        }
    }
}

pub fn extract_client_ip(headers: &HeaderMap, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub async fn rate_limit_cleanup_loop(
    limiter: Arc<RateLimiter>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = limiter.cleanup().await;
                if removed > 0 {
                    tracing::debug!(removed, "Rate limiter entries evicted");
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}
