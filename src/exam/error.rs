use thiserror::Error;

use crate::store::StoreError;

/// Failure reasons of the exam pipeline. Each generation stage has its own variant so callers
/// can tell which step came up empty.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("{field} is required")]
    MissingInput { field: &'static str },
    #[error("mocktest not found: {0}")]
    TestNotFound(String),
    #[error("institute not found: {0}")]
    InstituteNotFound(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("question not found: {0}")]
    QuestionNotFound(String),
    #[error("mocktest {0} has no generation rules")]
    NoGenerationRules(String),
    #[error("no topics resolved from the test's chapter and topic filters")]
    NoTopicsResolved,
    #[error("no questions matched the resolved topics and requested difficulties")]
    NoQuestionsMatched,
    #[error("no questions selected for the requested difficulty distribution")]
    NoQuestionsSelected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExamError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "MISSING_INPUT",
            Self::TestNotFound(_) => "MOCKTEST_NOT_FOUND",
            Self::InstituteNotFound(_) => "INSTITUTE_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            Self::NoGenerationRules(_) => "NO_GENERATION_RULES",
            Self::NoTopicsResolved => "NO_TOPICS_RESOLVED",
            Self::NoQuestionsMatched => "NO_QUESTIONS_MATCHED",
            Self::NoQuestionsSelected => "NO_QUESTIONS_SELECTED",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}
