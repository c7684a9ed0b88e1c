//! Learning resume: per-chapter mastery folded from a user's answer history.
//!
//! The stored rows are a cache. [`rebuild_learning_resume`] recomputes every row from the
//! responses, so running it twice with no new responses writes identical scores.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;

use crate::exam::config::MasteryConfig;
use crate::exam::error::ExamError;
use crate::exam::topics::{normalize_topic, split_topic_list};
use crate::store::operations::learning_resumes::{LearningResume, TopicStat, UpsertOutcome};
use crate::store::operations::responses::AnswerResponse;
use crate::store::Store;

const UNKNOWN_CHAPTER: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicTally {
    pub display_name: String,
    pub correct: u32,
    pub total: u32,
    pub skipped: u32,
    pub total_time_secs: f64,
}

impl TopicTally {
    /// Fraction in [0, 1].
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }

    pub fn avg_time(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.total_time_secs / f64::from(self.total)
        }
    }
}

/// Responses of one (subject, chapter), bucketed by normalised topic.
#[derive(Debug, Clone, Default)]
pub struct ChapterTally {
    pub subject: String,
    /// Chapter name as recorded on the responses, used for the weightage lookup.
    pub chapter: String,
    /// Name of the resume row. Equals `chapter` unless another subject uses the same name, in
    /// which case it becomes `"{chapter} ({subject})"` so (user, chapter) stays unique.
    pub label: String,
    pub topics: BTreeMap<String, TopicTally>,
}

/// Groups responses by (subject, chapter), then by topic. Subjects compare case-insensitively.
/// A response tagged with several topics counts once per topic. Responses without topics
/// contribute nothing.
pub fn aggregate_responses(responses: &[AnswerResponse]) -> Vec<ChapterTally> {
    let mut chapters: BTreeMap<(String, String), ChapterTally> = BTreeMap::new();

    for response in responses {
        let chapter = match response.chapter.trim() {
            "" => UNKNOWN_CHAPTER,
            name => name,
        };
        let topics = split_topic_list(&response.topics);
        if topics.is_empty() {
            continue;
        }
        let subject = response.subject.trim();
        let tally = chapters
            .entry((chapter.to_string(), subject.to_lowercase()))
            .or_insert_with(|| ChapterTally {
                subject: subject.to_string(),
                chapter: chapter.to_string(),
                label: chapter.to_string(),
                topics: BTreeMap::new(),
            });
        for topic in topics {
            let Some(key) = normalize_topic(&topic) else {
                continue;
            };
            let entry = tally.topics.entry(key).or_insert_with(|| TopicTally {
                display_name: topic.clone(),
                ..Default::default()
            });
            entry.total += 1;
            if response.is_correct {
                entry.correct += 1;
            }
            if response.is_skipped {
                entry.skipped += 1;
            }
            entry.total_time_secs += response.time_spent_secs.max(0.0);
        }
    }

    let mut per_name: HashMap<String, usize> = HashMap::new();
    for (chapter, _) in chapters.keys() {
        *per_name.entry(chapter.clone()).or_default() += 1;
    }
    chapters
        .into_values()
        .map(|mut tally| {
            if per_name.get(&tally.chapter).copied().unwrap_or(0) > 1 {
                tally.label = format!("{} ({})", tally.chapter, tally.subject);
            }
            tally
        })
        .collect()
}

/// round(accuracy × w_acc + (1 − avgTime/ref) × w_speed). The speed term goes negative past the
/// reference time.
pub fn topic_mastery(accuracy: f64, avg_time_secs: f64, config: &MasteryConfig) -> i64 {
    let score = accuracy * config.accuracy_weight
        + (1.0 - avg_time_secs / config.reference_time_secs) * config.speed_weight;
    score.round() as i64
}

/// round((100 − mastery) × weightage)
pub fn recommendation_score(overall_mastery: f64, weightage: f64) -> i64 {
    ((100.0 - overall_mastery) * weightage).round() as i64
}

/// Missing or zero weightage counts as the configured default.
pub fn effective_weightage(weightage: Option<f64>, config: &MasteryConfig) -> f64 {
    match weightage {
        Some(w) if w > 0.0 => w,
        _ => config.default_chapter_weightage,
    }
}

/// Turns one chapter tally into a resume row (weightage already resolved).
pub fn summarize_chapter(
    user_id: &str,
    tally: &ChapterTally,
    weightage: f64,
    config: &MasteryConfig,
) -> LearningResume {
    let mut stats = Vec::with_capacity(tally.topics.len());
    let (mut total, mut correct, mut skipped) = (0_u32, 0_u32, 0_u32);

    for topic in tally.topics.values() {
        let accuracy = topic.accuracy();
        let avg_time = topic.avg_time();
        stats.push(TopicStat {
            topic: topic.display_name.clone(),
            mastery_score: topic_mastery(accuracy, avg_time, config),
            accuracy: (accuracy * 100.0).round(),
            avg_time: avg_time.round(),
            attempts: topic.total,
        });
        total += topic.total;
        correct += topic.correct;
        skipped += topic.skipped;
    }

    let overall = if stats.is_empty() {
        0.0
    } else {
        stats.iter().map(|s| s.mastery_score as f64).sum::<f64>() / stats.len() as f64
    };

    LearningResume {
        user_id: user_id.to_string(),
        subject: tally.subject.clone(),
        chapter: tally.label.clone(),
        chapter_weightage: weightage,
        topics: stats,
        total_questions: total,
        skipped_count: skipped,
        incorrect_count: total - correct,
        mastery_score: overall.round() as i64,
        recommendation_score: recommendation_score(overall, weightage),
        last_activity_date: Utc::now(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuiltChapter {
    pub subject: String,
    pub chapter: String,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSummary {
    pub user_id: String,
    pub responses_read: usize,
    pub updated: Vec<RebuiltChapter>,
}

/// Recomputes and upserts every (user, chapter) resume row from the user's responses.
pub fn rebuild_learning_resume(
    store: &Store,
    config: &MasteryConfig,
    user_id: &str,
) -> Result<RebuildSummary, ExamError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ExamError::MissingInput { field: "userId" });
    }
    if store.get_user_by_id(user_id)?.is_none() {
        return Err(ExamError::UserNotFound(user_id.to_string()));
    }

    let responses = store.list_user_responses(user_id, config.response_fetch_limit)?;
    if responses.len() >= config.response_fetch_limit {
        tracing::warn!(
            user_id,
            limit = config.response_fetch_limit,
            "Response history truncated at fetch limit"
        );
    }

    let mut updated = Vec::new();
    for tally in aggregate_responses(&responses) {
        let weightage = store
            .find_chapter(&tally.subject, &tally.chapter)?
            .and_then(|chapter| chapter.weightage);
        let row = summarize_chapter(
            user_id,
            &tally,
            effective_weightage(weightage, config),
            config,
        );
        let outcome = store.upsert_learning_resume(&row)?;
        updated.push(RebuiltChapter {
            subject: row.subject,
            chapter: row.chapter,
            created: outcome == UpsertOutcome::Created,
        });
    }

    tracing::info!(
        user_id,
        responses = responses.len(),
        chapters = updated.len(),
        "Learning resume rebuilt"
    );
    Ok(RebuildSummary {
        user_id: user_id.to_string(),
        responses_read: responses.len(),
        updated,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::exam::types::Difficulty;
    use crate::store::operations::chapters::{Chapter, ChapterStatus};
    use crate::store::operations::users::User;

    fn response(chapter: &str, topics: &str, correct: bool, secs: f64) -> AnswerResponse {
        response_in("Physics", chapter, topics, correct, secs)
    }

    fn response_in(
        subject: &str,
        chapter: &str,
        topics: &str,
        correct: bool,
        secs: f64,
    ) -> AnswerResponse {
        AnswerResponse {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            question_id: "q1".to_string(),
            exam_category_id: None,
            subject: subject.to_string(),
            chapter: chapter.to_string(),
            topics: topics.to_string(),
            difficulty: Difficulty::Easy,
            time_spent_secs: secs,
            is_correct: correct,
            is_skipped: false,
            skip_count: 0,
            is_reattempt: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn mastery_formula_matches_policy_examples() {
        let config = MasteryConfig::default();
        assert_eq!(topic_mastery(1.0, 0.0, &config), 80);
        assert_eq!(topic_mastery(0.5, 120.0, &config), 30);
        // speed term turns negative for very slow answers
        assert_eq!(topic_mastery(0.0, 240.0, &config), -20);
    }

    #[test]
    fn recommendation_prefers_weak_heavy_chapters() {
        assert_eq!(recommendation_score(30.0, 10.0), 700);
        assert_eq!(recommendation_score(90.0, 1.0), 10);
        let config = MasteryConfig::default();
        assert_eq!(effective_weightage(None, &config), 1.0);
        assert_eq!(effective_weightage(Some(0.0), &config), 1.0);
    }

    #[test]
    fn multi_topic_response_counts_for_each_topic() {
        let tallies = aggregate_responses(&[
            response("c1", "Kinematics, motion", true, 30.0),
            response("c1", "kinematics", false, 90.0),
            response("", "optics", true, 10.0),
            response("c2", "  ", true, 10.0),
        ]);
        assert_eq!(tallies.len(), 2);
        let unknown = tallies.iter().find(|t| t.chapter == "Unknown").unwrap();
        assert_eq!(unknown.topics.len(), 1);

        let c1 = tallies.iter().find(|t| t.chapter == "c1").unwrap();
        let kinematics = &c1.topics["kinematics"];
        assert_eq!(kinematics.display_name, "Kinematics");
        assert_eq!(kinematics.total, 2);
        assert_eq!(kinematics.correct, 1);
        assert_eq!(kinematics.avg_time(), 60.0);
    }

    #[test]
    fn chapter_summary_averages_topic_mastery() {
        let config = MasteryConfig::default();
        let tallies = aggregate_responses(&[
            response("c1", "a", true, 0.0),
            response("c1", "b", false, 120.0),
        ]);
        let row = summarize_chapter("u1", &tallies[0], 2.0, &config);
        // a: 80, b: 0 -> mean 40
        assert_eq!(row.mastery_score, 40);
        assert_eq!(row.recommendation_score, 120);
        assert_eq!(row.total_questions, 2);
        assert_eq!(row.incorrect_count, 1);
    }

    #[test]
    fn rebuild_upserts_one_row_per_chapter() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("resume-db").to_str().unwrap()).unwrap();
        store.create_user(&User::new("u1", "A", "a@test.com")).unwrap();
        for r in [
            response("c1", "a", true, 10.0),
            response("c2", "b", false, 10.0),
        ] {
            store.create_response(&r).unwrap();
        }
        let config = MasteryConfig::default();

        let first = rebuild_learning_resume(&store, &config, "u1").unwrap();
        assert_eq!(first.updated.len(), 2);
        assert!(first.updated.iter().all(|c| c.created));

        let second = rebuild_learning_resume(&store, &config, "u1").unwrap();
        assert!(second.updated.iter().all(|c| !c.created));
        assert_eq!(store.list_learning_resumes("u1").unwrap().len(), 2);

        assert!(matches!(
            rebuild_learning_resume(&store, &config, "ghost"),
            Err(ExamError::UserNotFound(_))
        ));
    }

    #[test]
    fn shared_chapter_name_keeps_subjects_apart() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("resume-db2").to_str().unwrap()).unwrap();
        store.create_user(&User::new("u1", "A", "a@test.com")).unwrap();
        store
            .upsert_chapter(&Chapter {
                id: "ch-phy".to_string(),
                institute_id: "inst-1".to_string(),
                exam_category_id: "jee".to_string(),
                subject: "Physics".to_string(),
                name: "Basics".to_string(),
                topics: "units".to_string(),
                weightage: Some(8.0),
                status: ChapterStatus::Active,
                created_at: Utc::now(),
            })
            .unwrap();
        store
            .upsert_chapter(&Chapter {
                id: "ch-chem".to_string(),
                institute_id: "inst-1".to_string(),
                exam_category_id: "jee".to_string(),
                subject: "Chemistry".to_string(),
                name: "Basics".to_string(),
                topics: "moles".to_string(),
                weightage: Some(3.0),
                status: ChapterStatus::Active,
                created_at: Utc::now(),
            })
            .unwrap();
        for r in [
            response_in("Physics", "Basics", "units", true, 0.0),
            response_in("chemistry", "Basics", "moles", false, 0.0),
            response_in("Physics", "", "vectors", true, 0.0),
            response_in("Chemistry", "", "bonds", true, 0.0),
            response_in("Physics", "Optics", "lenses", true, 0.0),
        ] {
            store.create_response(&r).unwrap();
        }

        let summary = rebuild_learning_resume(&store, &MasteryConfig::default(), "u1").unwrap();
        assert_eq!(summary.updated.len(), 5);

        let rows = store.list_learning_resumes("u1").unwrap();
        assert_eq!(rows.len(), 5);
        let physics = rows.iter().find(|r| r.chapter == "Basics (Physics)").unwrap();
        assert_eq!(physics.chapter_weightage, 8.0);
        assert_eq!(physics.topics.len(), 1);
        assert_eq!(physics.topics[0].topic, "units");
        let chemistry = rows.iter().find(|r| r.chapter == "Basics (chemistry)").unwrap();
        assert_eq!(chemistry.chapter_weightage, 3.0);
        assert_eq!(chemistry.topics[0].topic, "moles");

        let unknown: Vec<_> = rows.iter().filter(|r| r.chapter.starts_with("Unknown (")).collect();
        assert_eq!(unknown.len(), 2);
        assert!(unknown.iter().all(|r| r.topics.len() == 1));
        // no collision, plain chapter name
        assert!(rows.iter().any(|r| r.chapter == "Optics"));
    }
}
