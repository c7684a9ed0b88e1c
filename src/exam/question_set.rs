use crate::exam::allocator::{allocate, BucketFill};
use crate::exam::config::GenerationConfig;
use crate::exam::error::ExamError;
use crate::exam::pool::filter_pool;
use crate::exam::syllabus::resolve_topics;
use crate::store::operations::question_sets::{QuestionSet, QuestionSetWrite};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub question_set: QuestionSet,
    /// True when the test already had a set and nothing was generated.
    pub existing: bool,
    /// Bucket fill report; empty for an existing set.
    pub buckets: Vec<BucketFill>,
}

/// Builds and persists the one question set a mock test may have.
///
/// Repeated calls for the same test return the stored set. Concurrent first calls race on the
/// test index; the loser gets the winner's set back.
pub fn generate_question_set(
    store: &Store,
    config: &GenerationConfig,
    mocktest_id: &str,
) -> Result<GenerationOutcome, ExamError> {
    let mocktest_id = mocktest_id.trim();
    if mocktest_id.is_empty() {
        return Err(ExamError::MissingInput {
            field: "mocktestId",
        });
    }

    let test = store
        .get_mock_test(mocktest_id)?
        .ok_or_else(|| ExamError::TestNotFound(mocktest_id.to_string()))?;
    if store.get_institute(&test.institute_id)?.is_none() {
        return Err(ExamError::InstituteNotFound(test.institute_id.clone()));
    }

    if let Some(existing) = store.get_question_set_by_test(&test.id)? {
        tracing::info!(mocktest_id = %test.id, question_set_id = %existing.id, "Question set already exists");
        return Ok(GenerationOutcome {
            question_set: existing,
            existing: true,
            buckets: Vec::new(),
        });
    }

    let rules = test
        .generation_rules
        .as_ref()
        .ok_or_else(|| ExamError::NoGenerationRules(test.id.clone()))?;

    let topics = resolve_topics(
        store,
        &rules.chapter_filters,
        &rules.topic_filters,
        config.chapter_fetch_limit,
    )?;
    if topics.is_empty() {
        return Err(ExamError::NoTopicsResolved);
    }

    let distribution = rules.difficulty_distribution;
    let pool = filter_pool(
        store,
        &topics,
        &distribution.requested_difficulties(),
        config.question_fetch_limit,
    )?;
    if pool.is_empty() {
        return Err(ExamError::NoQuestionsMatched);
    }

    let allocation = allocate(
        &pool,
        &distribution,
        config.marks_per_question,
        config.negative_marks_per_question,
    );
    if allocation.is_empty() {
        return Err(ExamError::NoQuestionsSelected);
    }

    if let Some(target) = rules.total_questions {
        if allocation.items.len() as u32 != target {
            tracing::warn!(
                mocktest_id = %test.id,
                target,
                selected = allocation.items.len(),
                "Generated question count differs from the test's target"
            );
        }
    }

    let question_set = QuestionSet::new(&test.id, &test.institute_id, allocation.items);
    match store.create_question_set(&question_set)? {
        QuestionSetWrite::Created(created) => {
            tracing::info!(
                mocktest_id = %test.id,
                question_set_id = %created.id,
                topics = topics.len(),
                pool = pool.len(),
                count = created.question_count,
                "Question set generated"
            );
            Ok(GenerationOutcome {
                question_set: created,
                existing: false,
                buckets: allocation.per_bucket,
            })
        }
        QuestionSetWrite::Existing(existing) => {
            tracing::info!(mocktest_id = %test.id, question_set_id = %existing.id, "Lost generation race, returning existing set");
            Ok(GenerationOutcome {
                question_set: existing,
                existing: true,
                buckets: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    use super::*;
    use crate::exam::types::{Difficulty, DifficultyDistribution};
    use crate::store::operations::chapters::{Chapter, ChapterStatus};
    use crate::store::operations::institutes::Institute;
    use crate::store::operations::mock_tests::{
        GenerationRules, MockTest, MockTestStatus, ScoringPolicy,
    };
    use crate::store::operations::questions::{AnswerOption, Question};

    fn seed(store: &Store, rules: Option<GenerationRules>) {
        store
            .upsert_institute(&Institute {
                id: "inst-1".to_string(),
                name: "Institute".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
        store
            .upsert_chapter(&Chapter {
                id: "chap-a".to_string(),
                institute_id: "inst-1".to_string(),
                exam_category_id: "jee".to_string(),
                subject: "Physics".to_string(),
                name: "Kinematics".to_string(),
                topics: "kinematics, motion".to_string(),
                weightage: Some(10.0),
                status: ChapterStatus::Active,
                created_at: Utc::now(),
            })
            .unwrap();
        for (id, difficulty) in [
            ("e1", Difficulty::Easy),
            ("e2", Difficulty::Easy),
            ("e3", Difficulty::Easy),
            ("m1", Difficulty::Medium),
            ("m2", Difficulty::Medium),
        ] {
            store
                .upsert_question(&Question {
                    id: id.to_string(),
                    institute_id: "inst-1".to_string(),
                    subject: "Physics".to_string(),
                    topics: vec!["kinematics".to_string()],
                    difficulty,
                    text: format!("question {id}"),
                    options: vec![AnswerOption {
                        text: "a".to_string(),
                        is_correct: true,
                    }],
                    is_reported: false,
                    active: true,
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        store
            .upsert_mock_test(&MockTest {
                id: "t1".to_string(),
                institute_id: "inst-1".to_string(),
                title: "Mock 1".to_string(),
                subjects: vec!["Physics".to_string()],
                generation_rules: rules,
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(1),
                duration_minutes: Some(180),
                scoring: ScoringPolicy::default(),
                status: MockTestStatus::Draft,
                created_at: Utc::now(),
            })
            .unwrap();
    }

    fn rules(chapters: &[&str], easy: u32, medium: u32) -> GenerationRules {
        GenerationRules {
            chapter_filters: chapters.iter().map(|c| c.to_string()).collect(),
            topic_filters: vec![],
            difficulty_distribution: DifficultyDistribution {
                easy,
                medium,
                ..Default::default()
            },
            total_questions: Some(easy + medium),
        }
    }

    #[test]
    fn generates_buckets_in_order_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("gen-db").to_str().unwrap()).unwrap();
        seed(&store, Some(rules(&["chap-a"], 2, 1)));
        let config = GenerationConfig::default();

        let first = generate_question_set(&store, &config, "t1").unwrap();
        assert!(!first.existing);
        let ids: Vec<_> = first
            .question_set
            .questions
            .iter()
            .map(|q| q.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["e1", "e2", "m1"]);
        assert_eq!(first.question_set.question_count, 3);

        let second = generate_question_set(&store, &config, "t1").unwrap();
        assert!(second.existing);
        assert_eq!(second.question_set.id, first.question_set.id);
    }

    #[test]
    fn each_empty_stage_has_its_own_error() {
        let config = GenerationConfig::default();

        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("gen-db2").to_str().unwrap()).unwrap();
        seed(&store, Some(rules(&[], 2, 0)));
        assert!(matches!(
            generate_question_set(&store, &config, "t1"),
            Err(ExamError::NoTopicsResolved)
        ));

        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("gen-db3").to_str().unwrap()).unwrap();
        seed(&store, Some(rules(&["chap-a"], 0, 0)));
        assert!(matches!(
            generate_question_set(&store, &config, "t1"),
            Err(ExamError::NoQuestionsMatched)
        ));

        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("gen-db4").to_str().unwrap()).unwrap();
        seed(&store, None);
        assert!(matches!(
            generate_question_set(&store, &config, "t1"),
            Err(ExamError::NoGenerationRules(_))
        ));
        assert!(store.get_question_set_by_test("t1").unwrap().is_none());
    }

    #[test]
    fn missing_test_and_blank_id_are_distinct() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("gen-db5").to_str().unwrap()).unwrap();
        let config = GenerationConfig::default();
        assert!(matches!(
            generate_question_set(&store, &config, "  "),
            Err(ExamError::MissingInput { .. })
        ));
        assert!(matches!(
            generate_question_set(&store, &config, "nope"),
            Err(ExamError::TestNotFound(_))
        ));
    }
}
