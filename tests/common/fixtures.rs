use chrono::{Duration, Utc};

use exam_prep_backend::exam::types::{Difficulty, DifficultyDistribution};
use exam_prep_backend::store::operations::chapters::{Chapter, ChapterStatus};
use exam_prep_backend::store::operations::institutes::Institute;
use exam_prep_backend::store::operations::learning_resumes::{LearningResume, TopicStat};
use exam_prep_backend::store::operations::mock_tests::{
    GenerationRules, MockTest, MockTestStatus, ScoringPolicy,
};
use exam_prep_backend::store::operations::questions::{AnswerOption, Question};
use exam_prep_backend::store::operations::responses::AnswerResponse;
use exam_prep_backend::store::operations::users::User;
use exam_prep_backend::store::Store;

pub const INSTITUTE_ID: &str = "inst-1";
pub const CATEGORY_ID: &str = "jee";

pub fn seed_institute(store: &Store) -> Institute {
    let institute = Institute {
        id: INSTITUTE_ID.to_string(),
        name: "Test Institute".to_string(),
        created_at: Utc::now(),
    };
    store.upsert_institute(&institute).expect("upsert institute");
    institute
}

pub fn seed_chapter(store: &Store, id: &str, subject: &str, name: &str, topics: &str) -> Chapter {
    let chapter = Chapter {
        id: id.to_string(),
        institute_id: INSTITUTE_ID.to_string(),
        exam_category_id: CATEGORY_ID.to_string(),
        subject: subject.to_string(),
        name: name.to_string(),
        topics: topics.to_string(),
        weightage: Some(10.0),
        status: ChapterStatus::Active,
        created_at: Utc::now(),
    };
    store.upsert_chapter(&chapter).expect("upsert chapter");
    chapter
}

pub fn seed_question(
    store: &Store,
    id: &str,
    subject: &str,
    topics: &[&str],
    difficulty: Difficulty,
) -> Question {
    let question = Question {
        id: id.to_string(),
        institute_id: INSTITUTE_ID.to_string(),
        subject: subject.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        difficulty,
        text: format!("question {id}"),
        options: vec![
            AnswerOption {
                text: "right".to_string(),
                is_correct: true,
            },
            AnswerOption {
                text: "wrong".to_string(),
                is_correct: false,
            },
        ],
        is_reported: false,
        active: true,
        created_at: Utc::now(),
    };
    store.upsert_question(&question).expect("upsert question");
    question
}

pub fn seed_mock_test(
    store: &Store,
    id: &str,
    chapter_filters: &[&str],
    distribution: DifficultyDistribution,
) -> MockTest {
    let now = Utc::now();
    let test = MockTest {
        id: id.to_string(),
        institute_id: INSTITUTE_ID.to_string(),
        title: format!("mock {id}"),
        subjects: vec!["Physics".to_string()],
        generation_rules: Some(GenerationRules {
            chapter_filters: chapter_filters.iter().map(|c| c.to_string()).collect(),
            topic_filters: Vec::new(),
            difficulty_distribution: distribution,
            total_questions: Some(distribution.total()),
        }),
        start_date: now,
        end_date: now + Duration::days(7),
        duration_minutes: Some(180),
        scoring: ScoringPolicy::default(),
        status: MockTestStatus::Published,
        created_at: now,
    };
    store.upsert_mock_test(&test).expect("upsert mock test");
    test
}

pub fn seed_user(store: &Store, id: &str) -> User {
    let user = User::new(id, &format!("user {id}"), &format!("{id}@test.com"));
    store.create_user(&user).expect("create seed user");
    user
}

pub fn seed_response(
    store: &Store,
    user_id: &str,
    question: &Question,
    chapter: &str,
    is_correct: bool,
    is_skipped: bool,
) -> AnswerResponse {
    let response = AnswerResponse {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        question_id: question.id.clone(),
        exam_category_id: Some(CATEGORY_ID.to_string()),
        subject: question.subject.clone(),
        chapter: chapter.to_string(),
        topics: question.topics.join(","),
        difficulty: question.difficulty,
        time_spent_secs: 30.0,
        is_correct,
        is_skipped,
        skip_count: u32::from(is_skipped),
        is_reattempt: false,
        created_at: Utc::now(),
    };
    store.create_response(&response).expect("create response");
    response
}

pub fn seed_resume(store: &Store, user_id: &str, chapter: &str, topic: &str, mastery: i64) {
    let resume = LearningResume {
        user_id: user_id.to_string(),
        subject: "Physics".to_string(),
        chapter: chapter.to_string(),
        chapter_weightage: 10.0,
        topics: vec![TopicStat {
            topic: topic.to_string(),
            mastery_score: mastery,
            accuracy: 50.0,
            avg_time: 60.0,
            attempts: 4,
        }],
        total_questions: 4,
        skipped_count: 0,
        incorrect_count: 2,
        mastery_score: mastery,
        recommendation_score: (100 - mastery) * 10,
        last_activity_date: Utc::now(),
    };
    store
        .upsert_learning_resume(&resume)
        .expect("upsert learning resume");
}
