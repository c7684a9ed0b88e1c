pub mod chapters;
pub mod institutes;
pub mod learning_resumes;
pub mod question_sets;
pub mod questions;
pub mod responses;
pub mod users;
