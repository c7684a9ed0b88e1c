//! Question-set generation and adaptive practice.
//!
//! Generation is a fixed pipeline: [`syllabus`] resolves the topic universe, [`pool`] filters
//! candidate questions, [`allocator`] fills the difficulty buckets and [`question_set`] persists
//! the result. Practice runs on [`resume`] (per-chapter mastery), [`recommender`] and
//! [`selector`]; [`xp`] handles progression.

pub mod allocator;
pub mod config;
pub mod error;
pub mod pool;
pub mod question_set;
pub mod recommender;
pub mod resume;
pub mod selector;
pub mod syllabus;
pub mod topics;
pub mod types;
pub mod xp;

pub use config::ExamConfig;
pub use error::ExamError;
