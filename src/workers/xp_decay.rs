use chrono::Utc;
use serde::Serialize;

use crate::constants::XP_DECAY_PAGE_SIZE;
use crate::exam::config::XpConfig;
use crate::exam::xp::decay_user;
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayReport {
    pub scanned: usize,
    pub changed: usize,
    pub failed: usize,
}

/// 对所有用户执行一次 XP 衰减 / 周计数重置。单个用户失败不影响其余用户。
pub async fn run(store: &Store, config: &XpConfig) -> DecayReport {
    run_in_pages(store, config, XP_DECAY_PAGE_SIZE).await
}

/// 按 user key 游标分页遍历，每页 `page_size` 个用户
pub async fn run_in_pages(store: &Store, config: &XpConfig, page_size: usize) -> DecayReport {
    tracing::debug!(page_size, "xp_decay: start");
    let page_size = page_size.max(1);
    let now = Utc::now();
    let mut report = DecayReport::default();
    let mut cursor: Option<String> = None;

    loop {
        let users = match store.list_users_after(cursor.as_deref(), page_size) {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, after = ?cursor, "xp_decay: failed to list users");
                break;
            }
        };
        report.scanned += users.len();
        for user in &users {
            match decay_user(store, config, &user.id, now) {
                Ok(true) => report.changed += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(user_id = %user.id, error = %e, "xp_decay: user update failed");
                }
            }
            tokio::task::yield_now().await;
        }
        if users.len() < page_size {
            break;
        }
        cursor = users.last().map(|u| u.id.clone());
    }

    tracing::info!(
        scanned = report.scanned,
        changed = report.changed,
        failed = report.failed,
        "xp_decay: done"
    );
    report
}
