pub const USERS: &str = "users";
pub const INSTITUTES: &str = "institutes";
pub const CHAPTERS: &str = "chapters";
pub const QUESTIONS: &str = "questions";
pub const MOCK_TESTS: &str = "mock_tests";
pub const QUESTION_SETS: &str = "question_sets";
pub const RESPONSES: &str = "responses";
pub const LEARNING_RESUMES: &str = "learning_resumes";
pub const CONFIG_VERSIONS: &str = "config_versions";

// Secondary index trees
pub const QUESTIONS_BY_DIFFICULTY: &str = "questions_by_difficulty";
pub const QUESTION_SETS_BY_TEST: &str = "question_sets_by_test";
