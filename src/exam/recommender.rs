use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::exam::config::RecommenderConfig;
use crate::exam::topics::{normalize_topic, TopicSet};
use crate::exam::types::Difficulty;
use crate::store::operations::learning_resumes::LearningResume;
use crate::store::operations::questions::Question;

/// Difficulties worth practising at a given topic mastery.
pub fn difficulty_band(mastery: i64, config: &RecommenderConfig) -> &'static [Difficulty] {
    if mastery < config.low_mastery_threshold {
        &[Difficulty::Easy, Difficulty::Medium]
    } else if mastery < config.high_mastery_threshold {
        &[Difficulty::Medium, Difficulty::Hard]
    } else {
        &[Difficulty::Hard]
    }
}

/// Topic -> mastery across all resume rows. A topic present in several chapters takes the value
/// of the last row seen.
pub fn topic_mastery_map(resumes: &[LearningResume]) -> BTreeMap<String, i64> {
    let mut map = BTreeMap::new();
    for resume in resumes {
        for stat in &resume.topics {
            if let Some(key) = normalize_topic(&stat.topic) {
                map.insert(key, stat.mastery_score);
            }
        }
    }
    map
}

/// Builds the personalised pool: for every topic in the resume, up to `picks_per_topic` random
/// questions in that topic's difficulty band, then shuffled and capped at `pool_size`.
pub fn recommend_questions<'a, R: Rng + ?Sized>(
    resumes: &[LearningResume],
    question_bank: &'a [Question],
    config: &RecommenderConfig,
    rng: &mut R,
) -> Vec<&'a Question> {
    let mut picked: Vec<&Question> = Vec::new();
    let mut seen = HashSet::new();

    for (topic, mastery) in topic_mastery_map(resumes) {
        let band = difficulty_band(mastery, config);
        let topic_set = TopicSet::from_names([topic.as_str()]);
        let mut matching: Vec<&Question> = question_bank
            .iter()
            .filter(|q| band.contains(&q.difficulty) && topic_set.intersects(&q.topics))
            .collect();
        matching.shuffle(rng);
        for question in matching.into_iter().take(config.picks_per_topic) {
            if seen.insert(question.id.as_str()) {
                picked.push(question);
            }
        }
    }

    picked.shuffle(rng);
    picked.truncate(config.pool_size);
    picked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::store::operations::learning_resumes::TopicStat;

    fn question(id: &str, difficulty: Difficulty, topic: &str) -> Question {
        Question {
            id: id.to_string(),
            institute_id: "inst-1".to_string(),
            subject: "Physics".to_string(),
            topics: vec![topic.to_string()],
            difficulty,
            text: "?".to_string(),
            options: vec![],
            is_reported: false,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn resume(topics: &[(&str, i64)]) -> LearningResume {
        LearningResume {
            user_id: "u1".to_string(),
            subject: "Physics".to_string(),
            chapter: "c1".to_string(),
            chapter_weightage: 1.0,
            topics: topics
                .iter()
                .map(|(topic, mastery)| TopicStat {
                    topic: topic.to_string(),
                    mastery_score: *mastery,
                    accuracy: 0.0,
                    avg_time: 0.0,
                    attempts: 1,
                })
                .collect(),
            total_questions: 1,
            skipped_count: 0,
            incorrect_count: 0,
            mastery_score: 0,
            recommendation_score: 0,
            last_activity_date: Utc::now(),
        }
    }

    #[test]
    fn bands_follow_thresholds() {
        let config = RecommenderConfig::default();
        assert_eq!(difficulty_band(0, &config), &[Difficulty::Easy, Difficulty::Medium]);
        assert_eq!(difficulty_band(69, &config), &[Difficulty::Easy, Difficulty::Medium]);
        assert_eq!(difficulty_band(70, &config), &[Difficulty::Medium, Difficulty::Hard]);
        assert_eq!(difficulty_band(89, &config), &[Difficulty::Medium, Difficulty::Hard]);
        assert_eq!(difficulty_band(90, &config), &[Difficulty::Hard]);
    }

    #[test]
    fn pool_respects_band_and_per_topic_cap() {
        let bank = vec![
            question("e1", Difficulty::Easy, "waves"),
            question("e2", Difficulty::Easy, "waves"),
            question("m1", Difficulty::Medium, "waves"),
            question("m2", Difficulty::Medium, "waves"),
            question("h1", Difficulty::Hard, "waves"),
            question("h2", Difficulty::Hard, "optics"),
            question("e3", Difficulty::Easy, "optics"),
        ];
        let resumes = vec![resume(&[("Waves", 40), ("optics", 95)])];
        let config = RecommenderConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        let pool = recommend_questions(&resumes, &bank, &config, &mut rng);
        let waves = pool.iter().filter(|q| q.topics[0] == "waves").count();
        assert_eq!(waves, 3);
        assert!(pool
            .iter()
            .filter(|q| q.topics[0] == "waves")
            .all(|q| q.difficulty != Difficulty::Hard));
        let optics: Vec<_> = pool.iter().filter(|q| q.topics[0] == "optics").collect();
        assert_eq!(optics.len(), 1);
        assert_eq!(optics[0].id, "h2");
    }

    #[test]
    fn empty_resume_gives_empty_pool() {
        let bank = vec![question("e1", Difficulty::Easy, "waves")];
        let mut rng = StdRng::seed_from_u64(1);
        let pool = recommend_questions(&[], &bank, &RecommenderConfig::default(), &mut rng);
        assert!(pool.is_empty());
    }
}
