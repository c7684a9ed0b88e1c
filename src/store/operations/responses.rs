use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exam::topics::TopicSet;
use crate::exam::types::Difficulty;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// One graded (or skipped) answer. Append-only: there is no update operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub exam_category_id: Option<String>,
    pub subject: String,
    /// Chapter id or chapter name, as the client reported it.
    pub chapter: String,
    /// Denormalized comma-separated topic list.
    pub topics: String,
    pub difficulty: Difficulty,
    pub time_spent_secs: f64,
    pub is_correct: bool,
    #[serde(default)]
    pub is_skipped: bool,
    #[serde(default)]
    pub skip_count: u32,
    #[serde(default)]
    pub is_reattempt: bool,
    pub created_at: DateTime<Utc>,
}

impl AnswerResponse {
    pub fn topic_set(&self) -> TopicSet {
        TopicSet::from_list(&self.topics)
    }

    /// Answered and wrong. Skipped rows never count as incorrect.
    pub fn is_incorrect(&self) -> bool {
        !self.is_correct && !self.is_skipped
    }
}

impl Store {
    pub fn create_response(&self, response: &AnswerResponse) -> Result<(), StoreError> {
        let key = keys::response_key(
            &response.user_id,
            response.created_at.timestamp_millis(),
            &response.id,
        )?;
        let bytes = Self::serialize(response)?;

        let cas_result = self
            .responses
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))
            .map_err(StoreError::Sled)?;
        if cas_result.is_err() {
            return Err(StoreError::Conflict {
                entity: "response".to_string(),
                key: response.id.clone(),
            });
        }
        Ok(())
    }

    /// Newest first, at most `limit` rows.
    pub fn list_user_responses(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AnswerResponse>, StoreError> {
        let prefix = keys::response_prefix(user_id)?;
        let mut responses = Vec::new();
        for item in self.responses.scan_prefix(prefix.as_bytes()) {
            if responses.len() >= limit {
                break;
            }
            let (_, value) = item?;
            responses.push(Self::deserialize::<AnswerResponse>(&value)?);
        }
        Ok(responses)
    }
}
