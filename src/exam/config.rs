use serde::{Deserialize, Serialize};

use crate::exam::types::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Marks written onto every generated question set item.
    pub marks_per_question: f64,
    pub negative_marks_per_question: f64,
    pub question_fetch_limit: usize,
    pub chapter_fetch_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            marks_per_question: 4.0,
            negative_marks_per_question: -1.0,
            question_fetch_limit: 1000,
            chapter_fetch_limit: 100,
        }
    }
}

/// mastery = round(accuracy × accuracy_weight + (1 − avgTime/reference) × speed_weight), accuracy in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryConfig {
    pub accuracy_weight: f64,
    pub speed_weight: f64,
    pub reference_time_secs: f64,
    pub default_chapter_weightage: f64,
    pub response_fetch_limit: usize,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            accuracy_weight: 60.0,
            speed_weight: 20.0,
            reference_time_secs: 120.0,
            default_chapter_weightage: 1.0,
            response_fetch_limit: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommenderConfig {
    /// Below this mastery a topic gets easy/medium questions.
    pub low_mastery_threshold: i64,
    /// At or above this mastery a topic only gets hard questions.
    pub high_mastery_threshold: i64,
    pub picks_per_topic: usize,
    pub pool_size: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            low_mastery_threshold: 70,
            high_mastery_threshold: 90,
            picks_per_topic: 3,
            pool_size: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpConfig {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
    pub very_hard: f64,
    pub reattempt_multiplier: f64,
    pub fast_answer_bonus: f64,
    pub fast_answer_secs: f64,
    pub xp_per_level: u64,
    pub decay_after_days: i64,
    pub decay_amount: u64,
}

impl XpConfig {
    pub fn base_for(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::VeryHard => self.very_hard,
        }
    }
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            easy: 5.0,
            medium: 7.0,
            hard: 10.0,
            very_hard: 12.0,
            reattempt_multiplier: 1.5,
            fast_answer_bonus: 2.0,
            fast_answer_secs: 60.0,
            xp_per_level: 500,
            decay_after_days: 14,
            decay_amount: 25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamConfig {
    pub generation: GenerationConfig,
    pub mastery: MasteryConfig,
    pub recommender: RecommenderConfig,
    pub xp: XpConfig,
}

impl ExamConfig {
    pub fn from_env(env_config: &crate::config::ExamEnvConfig) -> Self {
        let mut config = Self::default();
        config.generation.question_fetch_limit = env_config.question_fetch_limit;
        config.generation.chapter_fetch_limit = env_config.chapter_fetch_limit;
        config.mastery.response_fetch_limit = env_config.response_fetch_limit;
        config.recommender.pool_size = env_config.recommendation_pool_size;
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.generation.marks_per_question <= 0.0 {
            return Err("generation.marks_per_question must be > 0".to_string());
        }
        if self.generation.negative_marks_per_question > 0.0 {
            return Err("generation.negative_marks_per_question must be <= 0".to_string());
        }
        if self.generation.question_fetch_limit == 0 || self.generation.chapter_fetch_limit == 0 {
            return Err("generation fetch limits must be > 0".to_string());
        }
        if self.mastery.reference_time_secs <= 0.0 {
            return Err("mastery.reference_time_secs must be > 0".to_string());
        }
        if self.mastery.accuracy_weight < 0.0 || self.mastery.speed_weight < 0.0 {
            return Err("mastery weights must be >= 0".to_string());
        }
        if self.mastery.default_chapter_weightage <= 0.0 {
            return Err("mastery.default_chapter_weightage must be > 0".to_string());
        }
        if self.mastery.response_fetch_limit == 0 {
            return Err("mastery.response_fetch_limit must be > 0".to_string());
        }
        if !(0..=100).contains(&self.recommender.low_mastery_threshold)
            || !(0..=100).contains(&self.recommender.high_mastery_threshold)
        {
            return Err("recommender thresholds must be in [0,100]".to_string());
        }
        if self.recommender.low_mastery_threshold > self.recommender.high_mastery_threshold {
            return Err("recommender.low_mastery_threshold must not exceed high".to_string());
        }
        if self.recommender.picks_per_topic == 0 || self.recommender.pool_size == 0 {
            return Err("recommender picks_per_topic and pool_size must be > 0".to_string());
        }
        if Difficulty::ALL.iter().any(|d| self.xp.base_for(*d) < 0.0) {
            return Err("xp base values must be >= 0".to_string());
        }
        if self.xp.reattempt_multiplier < 0.0 || self.xp.fast_answer_bonus < 0.0 {
            return Err("xp multiplier and bonus must be >= 0".to_string());
        }
        if self.xp.xp_per_level == 0 {
            return Err("xp.xp_per_level must be > 0".to_string());
        }
        if self.xp.decay_after_days <= 0 {
            return Err("xp.decay_after_days must be > 0".to_string());
        }
        Ok(())
    }
}
