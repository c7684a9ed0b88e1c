use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;

use crate::exam::topics::TopicSet;
use crate::exam::types::Difficulty;
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub institute_id: String,
    pub subject: String,
    /// Free-form topic tags.
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Question {
    /// Reported or deactivated questions are never handed out.
    pub fn is_servable(&self) -> bool {
        self.active && !self.is_reported
    }
}

/// Data-source side of a question lookup. Difficulty goes through the secondary index;
/// subject, topic and exclusion filters are applied while scanning, so `limit` only counts
/// questions that pass all of them.
#[derive(Debug, Clone, Default)]
pub struct QuestionQuery {
    pub difficulties: Vec<Difficulty>,
    pub subject: Option<String>,
    /// `None` skips the topic check; `Some(empty)` matches nothing.
    pub topics: Option<TopicSet>,
    pub exclude_ids: HashSet<String>,
    pub include_unservable: bool,
    pub limit: usize,
}

impl QuestionQuery {
    fn accepts(&self, question: &Question) -> bool {
        if !self.include_unservable && !question.is_servable() {
            return false;
        }
        if self.exclude_ids.contains(&question.id) {
            return false;
        }
        if let Some(subject) = &self.subject {
            if !question.subject.eq_ignore_ascii_case(subject.trim()) {
                return false;
            }
        }
        self.topics
            .as_ref()
            .map_or(true, |topics| topics.intersects(&question.topics))
    }
}

impl Store {
    pub fn upsert_question(&self, question: &Question) -> Result<(), StoreError> {
        let key = keys::question_key(&question.id)?;
        let bytes = Self::serialize(question)?;
        let index_key =
            keys::question_difficulty_index_key(question.difficulty.as_str(), &question.id)?;

        (&self.questions, &self.questions_by_difficulty)
            .transaction(|(tx_questions, tx_index)| {
                if let Some(old_raw) = tx_questions.get(key.as_bytes())? {
                    let old: Question = serde_json::from_slice(&old_raw).map_err(|error| {
                        ConflictableTransactionError::Abort(StoreError::Serialization(error))
                    })?;
                    if old.difficulty != question.difficulty {
                        let old_index_key =
                            keys::question_difficulty_index_key(old.difficulty.as_str(), &old.id)
                                .map_err(ConflictableTransactionError::Abort)?;
                        tx_index.remove(old_index_key.as_bytes())?;
                    }
                }
                tx_questions.insert(key.as_bytes(), bytes.as_slice())?;
                tx_index.insert(index_key.as_bytes(), &[])?;
                Ok(())
            })
            .map_err(|error: TransactionError<StoreError>| match error {
                TransactionError::Abort(store_error) => store_error,
                TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
            })
    }

    pub fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        let key = keys::question_key(question_id)?;
        match self.questions.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 批量获取题目（仅返回存在的题目，无效 id 跳过）
    pub fn get_questions_by_ids(
        &self,
        question_ids: &[String],
    ) -> Result<HashMap<String, Question>, StoreError> {
        let mut questions = HashMap::with_capacity(question_ids.len());
        for question_id in question_ids {
            if questions.contains_key(question_id) || keys::question_key(question_id).is_err() {
                continue;
            }
            if let Some(question) = self.get_question(question_id)? {
                questions.insert(question_id.clone(), question);
            }
        }
        Ok(questions)
    }

    /// Returns questions in a stable order: by difficulty bucket, then by id.
    pub fn find_questions(&self, query: &QuestionQuery) -> Result<Vec<Question>, StoreError> {
        let mut out = Vec::new();
        if query.limit == 0 {
            return Ok(out);
        }

        if query.difficulties.is_empty() {
            for item in self.questions.iter() {
                let (_, value) = item?;
                let question: Question = Self::deserialize(&value)?;
                if query.accepts(&question) {
                    out.push(question);
                    if out.len() >= query.limit {
                        break;
                    }
                }
            }
            return Ok(out);
        }

        let mut difficulties: Vec<Difficulty> = query
            .difficulties
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        difficulties.sort();

        'outer: for difficulty in difficulties {
            let prefix = keys::question_difficulty_prefix(difficulty.as_str())?;
            for item in self.questions_by_difficulty.scan_prefix(prefix.as_bytes()) {
                let (index_key, _) = item?;
                let question_id = String::from_utf8_lossy(&index_key[prefix.len()..]).to_string();
                let Some(question) = self.get_question(&question_id)? else {
                    tracing::warn!(question_id = %question_id, "Dangling difficulty index entry");
                    continue;
                };
                if question.difficulty == difficulty && query.accepts(&question) {
                    out.push(question);
                    if out.len() >= query.limit {
                        break 'outer;
                    }
                }
            }
        }
        Ok(out)
    }

    pub fn count_questions(&self) -> usize {
        self.questions.len()
    }
}
