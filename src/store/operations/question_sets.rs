use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetItem {
    pub question_id: String,
    /// 1-based display order.
    pub order: u32,
    pub marks: f64,
    pub negative_marks: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub id: String,
    pub mocktest_id: String,
    pub institute_id: String,
    pub questions: Vec<QuestionSetItem>,
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionSet {
    pub fn new(mocktest_id: &str, institute_id: &str, questions: Vec<QuestionSetItem>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mocktest_id: mocktest_id.to_string(),
            institute_id: institute_id.to_string(),
            question_count: questions.len(),
            questions,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub enum QuestionSetWrite {
    Created(QuestionSet),
    /// Another set already holds the test; the caller's set was not written.
    Existing(QuestionSet),
}

impl Store {
    /// Claims the per-test slot with a compare-and-swap on the test index, then writes the set.
    /// Losing the race is not an error: the winner's set is returned as `Existing`.
    pub fn create_question_set(&self, set: &QuestionSet) -> Result<QuestionSetWrite, StoreError> {
        let mut set = set.clone();
        set.question_count = set.questions.len();

        let index_key = keys::question_set_test_index_key(&set.mocktest_id)?;
        let set_key = keys::question_set_key(&set.id)?;

        let cas_result = self
            .question_sets_by_test
            .compare_and_swap(
                index_key.as_bytes(),
                None::<&[u8]>,
                Some(set.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if let Err(cas_error) = cas_result {
            let existing_id = cas_error
                .current
                .map(|raw| String::from_utf8_lossy(&raw).to_string())
                .unwrap_or_default();
            return match self.get_question_set(&existing_id)? {
                Some(existing) => Ok(QuestionSetWrite::Existing(existing)),
                None => Err(StoreError::Conflict {
                    entity: "question_set_by_test".to_string(),
                    key: set.mocktest_id.clone(),
                }),
            };
        }

        let bytes = Self::serialize(&set)?;
        if let Err(e) = self.question_sets.insert(set_key.as_bytes(), bytes) {
            let _ = self.question_sets_by_test.remove(index_key.as_bytes());
            return Err(StoreError::Sled(e));
        }

        Ok(QuestionSetWrite::Created(set))
    }

    pub fn get_question_set(&self, set_id: &str) -> Result<Option<QuestionSet>, StoreError> {
        let Ok(key) = keys::question_set_key(set_id) else {
            return Ok(None);
        };
        match self.question_sets.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_question_set_by_test(
        &self,
        mocktest_id: &str,
    ) -> Result<Option<QuestionSet>, StoreError> {
        let index_key = keys::question_set_test_index_key(mocktest_id)?;
        let Some(raw_id) = self.question_sets_by_test.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let set_id = String::from_utf8_lossy(&raw_id).to_string();
        self.get_question_set(&set_id)
    }
}
