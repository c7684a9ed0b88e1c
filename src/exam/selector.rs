//! Next-question selection for practice mode.
//!
//! Priority: review mode (incorrect or skipped history) first, then the personalised pool built
//! from the learning resume, then any unattempted question matching the filters. An empty result
//! is `Ok(None)`, not an error.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::exam::config::ExamConfig;
use crate::exam::error::ExamError;
use crate::exam::recommender::recommend_questions;
use crate::exam::syllabus::resolve_topics;
use crate::exam::topics::TopicSet;
use crate::exam::types::{Difficulty, SelectionMode};
use crate::store::operations::questions::{Question, QuestionQuery};
use crate::store::operations::responses::AnswerResponse;
use crate::store::Store;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionRequest {
    #[serde(default)]
    pub user_id: String,
    pub subject: Option<String>,
    /// Chapter ids restricting the topics.
    #[serde(default)]
    pub syllabus: Vec<String>,
    #[serde(default)]
    pub mode: SelectionMode,
    #[serde(default)]
    pub attempted_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionSource {
    Incorrect,
    Skipped,
    Personalized,
    Random,
}

/// Question as served to a learner: answer options without correctness flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServedQuestion {
    pub id: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for ServedQuestion {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            subject: question.subject.clone(),
            topics: question.topics.clone(),
            difficulty: question.difficulty,
            text: question.text.clone(),
            options: question.options.iter().map(|o| o.text.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub question: ServedQuestion,
    pub source: SelectionSource,
}

/// Subject and syllabus constraints shared by every selection path.
struct QuestionFilter {
    subject: Option<String>,
    syllabus_ids: HashSet<String>,
    /// `None` when no syllabus was given; `Some(empty)` matches nothing.
    syllabus_topics: Option<TopicSet>,
}

impl QuestionFilter {
    fn subject_matches(&self, subject: &str) -> bool {
        self.subject
            .as_deref()
            .map_or(true, |wanted| wanted.eq_ignore_ascii_case(subject.trim()))
    }

    fn accepts_response(&self, response: &AnswerResponse) -> bool {
        if !self.subject_matches(&response.subject) {
            return false;
        }
        match &self.syllabus_topics {
            None => true,
            Some(topics) => {
                self.syllabus_ids.contains(response.chapter.trim())
                    || topics.intersects(response.topics.split(','))
            }
        }
    }
}

pub fn select_next_question<R: Rng + ?Sized>(
    store: &Store,
    config: &ExamConfig,
    request: &NextQuestionRequest,
    rng: &mut R,
) -> Result<Option<NextQuestion>, ExamError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ExamError::MissingInput { field: "userId" });
    }
    if store.get_user_by_id(user_id)?.is_none() {
        return Err(ExamError::UserNotFound(user_id.to_string()));
    }

    let subject = request
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);
    let syllabus_ids: HashSet<String> = request
        .syllabus
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let syllabus_topics = if syllabus_ids.is_empty() {
        None
    } else {
        let ids: Vec<String> = syllabus_ids.iter().cloned().collect();
        let none: [&str; 0] = [];
        Some(resolve_topics(
            store,
            &ids,
            &none,
            config.generation.chapter_fetch_limit,
        )?)
    };
    let filter = QuestionFilter {
        subject,
        syllabus_ids,
        syllabus_topics,
    };
    let attempted: HashSet<&str> = request.attempted_ids.iter().map(String::as_str).collect();

    let review = match request.mode {
        SelectionMode::IncorrectOnly => Some((SelectionSource::Incorrect, true)),
        SelectionMode::SkippedOnly => Some((SelectionSource::Skipped, false)),
        SelectionMode::Normal => None,
    };
    if let Some((source, incorrect)) = review {
        if let Some(question) =
            pick_from_history(store, config, user_id, &filter, &attempted, incorrect, rng)?
        {
            tracing::debug!(user_id, question_id = %question.id, ?source, "Serving review question");
            return Ok(Some(NextQuestion {
                question: ServedQuestion::from(&question),
                source,
            }));
        }
        tracing::debug!(user_id, ?source, "No review candidates, falling back");
    }

    // exclusions and syllabus topics go into the scan so the fetch limit never hides an
    // untried match
    let unattempted: Vec<Question> = store.find_questions(&QuestionQuery {
        subject: filter.subject.clone(),
        topics: filter.syllabus_topics.clone(),
        exclude_ids: attempted.iter().map(|id| id.to_string()).collect(),
        limit: config.generation.question_fetch_limit,
        ..Default::default()
    })?;

    let resumes = store.list_learning_resumes(user_id)?;
    let personalized = recommend_questions(&resumes, &unattempted, &config.recommender, rng);
    if let Some(question) = personalized.choose(rng) {
        return Ok(Some(NextQuestion {
            question: ServedQuestion::from(*question),
            source: SelectionSource::Personalized,
        }));
    }

    Ok(unattempted.choose(rng).map(|question| NextQuestion {
        question: ServedQuestion::from(question),
        source: SelectionSource::Random,
    }))
}

fn pick_from_history<R: Rng + ?Sized>(
    store: &Store,
    config: &ExamConfig,
    user_id: &str,
    filter: &QuestionFilter,
    attempted: &HashSet<&str>,
    incorrect: bool,
    rng: &mut R,
) -> Result<Option<Question>, ExamError> {
    let responses = store.list_user_responses(user_id, config.mastery.response_fetch_limit)?;

    let mut seen = HashSet::new();
    let question_ids: Vec<String> = responses
        .iter()
        .filter(|r| {
            if incorrect {
                r.is_incorrect()
            } else {
                r.is_skipped
            }
        })
        .filter(|r| filter.accepts_response(r))
        .filter(|r| !attempted.contains(r.question_id.as_str()))
        .filter(|r| seen.insert(r.question_id.clone()))
        .map(|r| r.question_id.clone())
        .collect();

    let questions = store.get_questions_by_ids(&question_ids)?;
    let candidates: Vec<&Question> = question_ids
        .iter()
        .filter_map(|id| questions.get(id))
        .filter(|q| q.is_servable())
        .collect();
    Ok(candidates.choose(rng).map(|q| (*q).clone()))
}
