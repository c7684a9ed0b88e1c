pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub users: sled::Tree,
    pub institutes: sled::Tree,
    pub chapters: sled::Tree,
    pub questions: sled::Tree,
    pub mock_tests: sled::Tree,
    pub question_sets: sled::Tree,
    pub responses: sled::Tree,
    pub learning_resumes: sled::Tree,
    pub config_versions: sled::Tree,
    // Secondary index trees
    pub questions_by_difficulty: sled::Tree,
    pub question_sets_by_test: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("CAS retry exhausted after {attempts} attempts: entity={entity}, key={key}")]
    CasRetryExhausted {
        entity: String,
        key: String,
        attempts: u32,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let users = db.open_tree(trees::USERS)?;
        let institutes = db.open_tree(trees::INSTITUTES)?;
        let chapters = db.open_tree(trees::CHAPTERS)?;
        let questions = db.open_tree(trees::QUESTIONS)?;
        let mock_tests = db.open_tree(trees::MOCK_TESTS)?;
        let question_sets = db.open_tree(trees::QUESTION_SETS)?;
        let responses = db.open_tree(trees::RESPONSES)?;
        let learning_resumes = db.open_tree(trees::LEARNING_RESUMES)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;
        // Secondary index trees
        let questions_by_difficulty = db.open_tree(trees::QUESTIONS_BY_DIFFICULTY)?;
        let question_sets_by_test = db.open_tree(trees::QUESTION_SETS_BY_TEST)?;

        Ok(Self {
            db,
            users,
            institutes,
            chapters,
            questions,
            mock_tests,
            question_sets,
            responses,
            learning_resumes,
            config_versions,
            questions_by_difficulty,
            question_sets_by_test,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
