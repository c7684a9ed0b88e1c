use std::ops::Bound;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAS_RETRIES;
use crate::store::keys;
use crate::store::{Store, StoreError};

const EMAIL_INDEX_PREFIX: &str = "email:";

/// Gamification counters owned by the XP engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub xp: u64,
    pub xp_spent: u64,
    pub xp_earned_this_week: u64,
    pub last_xp_update_at: Option<DateTime<Utc>>,
    pub level: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0,
            xp_spent: 0,
            xp_earned_this_week: 0,
            last_xp_update_at: None,
            level: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub institute_id: Option<String>,
    #[serde(default)]
    pub progression: Progression,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: &str, name: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            institute_id: None,
            progression: Progression::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Store {
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let email_key = keys::user_email_index_key(&user.email)?;
        let user_key = keys::user_key(&user.id)?;

        // 原子占用邮箱索引，并发注册同一邮箱时只有一个成功
        let cas_result = self
            .users
            .compare_and_swap(
                email_key.as_bytes(),
                None::<&[u8]>,
                Some(user.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if cas_result.is_err() {
            return Err(StoreError::Conflict {
                entity: "user_email".to_string(),
                key: user.email.clone(),
            });
        }

        let user_bytes = Self::serialize(user)?;
        if let Err(e) = self.users.insert(user_key.as_bytes(), user_bytes) {
            let _ = self.users.remove(email_key.as_bytes());
            return Err(StoreError::Sled(e));
        }

        Ok(())
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(user_id)?;
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// One page of users in key order, starting strictly after `after` (a user id).
    /// Email index entries are skipped without being decoded.
    pub fn list_users_after(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<User>, StoreError> {
        let start = match after {
            Some(user_id) => Bound::Excluded(keys::user_key(user_id)?.into_bytes()),
            None => Bound::Unbounded,
        };
        let mut users = Vec::new();
        for item in self.users.range::<Vec<u8>, _>((start, Bound::Unbounded)) {
            if users.len() >= limit {
                break;
            }
            let (key, value) = item?;
            if key.starts_with(EMAIL_INDEX_PREFIX.as_bytes()) {
                continue;
            }
            users.push(Self::deserialize::<User>(&value)?);
        }
        Ok(users)
    }

    /// Read-modify-write on a user's progression guarded by compare-and-swap.
    ///
    /// `mutate` may run several times if other writers interleave; it returns `false` to
    /// signal "nothing to change", in which case no write happens and `None` is returned.
    pub fn update_progression<F>(
        &self,
        user_id: &str,
        mut mutate: F,
    ) -> Result<Option<Progression>, StoreError>
    where
        F: FnMut(&mut Progression) -> bool,
    {
        let key = keys::user_key(user_id)?;

        for _ in 0..MAX_CAS_RETRIES {
            let Some(current_raw) = self.users.get(key.as_bytes())? else {
                return Err(StoreError::NotFound {
                    entity: "user".to_string(),
                    key: user_id.to_string(),
                });
            };
            let mut user: User = Self::deserialize(&current_raw)?;
            if !mutate(&mut user.progression) {
                return Ok(None);
            }
            user.updated_at = Utc::now();
            let next_raw = Self::serialize(&user)?;

            let swapped = self
                .users
                .compare_and_swap(key.as_bytes(), Some(current_raw), Some(next_raw))
                .map_err(StoreError::Sled)?;
            match swapped {
                Ok(()) => return Ok(Some(user.progression)),
                Err(_) => {
                    tracing::debug!(user_id, "Progression CAS lost, retrying");
                }
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "user_progression".to_string(),
            key: user_id.to_string(),
            attempts: MAX_CAS_RETRIES,
        })
    }
}
