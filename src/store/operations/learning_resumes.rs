use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicStat {
    pub topic: String,
    pub mastery_score: i64,
    /// Percentage, 0-100.
    pub accuracy: f64,
    /// Seconds.
    pub avg_time: f64,
    pub attempts: u32,
}

/// Per (user, chapter) summary. Always recomputable from the user's responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResume {
    pub user_id: String,
    pub subject: String,
    pub chapter: String,
    pub chapter_weightage: f64,
    pub topics: Vec<TopicStat>,
    pub total_questions: u32,
    pub skipped_count: u32,
    pub incorrect_count: u32,
    pub mastery_score: i64,
    pub recommendation_score: i64,
    pub last_activity_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl Store {
    /// Single-key write on `user_id:chapter`, so a (user, chapter) pair can never appear twice.
    pub fn upsert_learning_resume(
        &self,
        resume: &LearningResume,
    ) -> Result<UpsertOutcome, StoreError> {
        let key = keys::learning_resume_key(&resume.user_id, &resume.chapter)?;
        let previous = self
            .learning_resumes
            .insert(key.as_bytes(), Self::serialize(resume)?)?;
        Ok(if previous.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    pub fn get_learning_resume(
        &self,
        user_id: &str,
        chapter: &str,
    ) -> Result<Option<LearningResume>, StoreError> {
        let key = keys::learning_resume_key(user_id, chapter)?;
        match self.learning_resumes.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Highest recommendation score first; ties by chapter for a stable order.
    pub fn list_learning_resumes(&self, user_id: &str) -> Result<Vec<LearningResume>, StoreError> {
        let prefix = keys::learning_resume_prefix(user_id)?;
        let mut rows = Vec::new();
        for item in self.learning_resumes.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            rows.push(Self::deserialize::<LearningResume>(&value)?);
        }
        rows.sort_by(|a, b| {
            b.recommendation_score
                .cmp(&a.recommendation_score)
                .then_with(|| a.chapter.cmp(&b.chapter))
        });
        Ok(rows)
    }
}
