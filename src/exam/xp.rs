use chrono::{DateTime, Datelike, Utc};

use crate::exam::config::XpConfig;
use crate::exam::error::ExamError;
use crate::exam::types::Difficulty;
use crate::store::operations::responses::AnswerResponse;
use crate::store::operations::users::Progression;
use crate::store::Store;

/// XP for one correct answer. Incorrect or skipped answers earn nothing.
pub fn xp_award(
    config: &XpConfig,
    difficulty: Difficulty,
    is_correct: bool,
    is_skipped: bool,
    is_reattempt: bool,
    time_spent_secs: f64,
) -> u64 {
    if !is_correct || is_skipped {
        return 0;
    }
    let mut xp = config.base_for(difficulty);
    if is_reattempt {
        xp *= config.reattempt_multiplier;
    }
    if time_spent_secs <= config.fast_answer_secs {
        xp += config.fast_answer_bonus;
    }
    xp.round().max(0.0) as u64
}

pub fn level_for(xp: u64, config: &XpConfig) -> u32 {
    (xp / config.xp_per_level.max(1)) as u32 + 1
}

fn iso_week(at: DateTime<Utc>) -> (i32, u32) {
    let week = at.iso_week();
    (week.year(), week.week())
}

/// Adds an award. The weekly counter restarts when the last update fell in an earlier ISO week.
pub fn apply_award(
    progression: &mut Progression,
    award: u64,
    now: DateTime<Utc>,
    config: &XpConfig,
) -> bool {
    if award == 0 {
        return false;
    }
    if progression
        .last_xp_update_at
        .is_some_and(|last| iso_week(last) != iso_week(now))
    {
        progression.xp_earned_this_week = 0;
    }
    progression.xp += award;
    progression.xp_earned_this_week += award;
    progression.last_xp_update_at = Some(now);
    progression.level = level_for(progression.xp, config);
    true
}

/// One maintenance pass. Two independent checks: stale XP loses a flat amount, and the weekly
/// counter resets on a new ISO week. Returns whether anything changed; a change stamps `now`.
pub fn apply_decay(progression: &mut Progression, now: DateTime<Utc>, config: &XpConfig) -> bool {
    let last = progression.last_xp_update_at.unwrap_or(now);
    let mut changed = false;

    if (now - last).num_days() > config.decay_after_days && progression.xp > 0 {
        progression.xp = progression.xp.saturating_sub(config.decay_amount);
        progression.level = level_for(progression.xp, config);
        changed = true;
    }
    if iso_week(now) != iso_week(last) && progression.xp_earned_this_week != 0 {
        progression.xp_earned_this_week = 0;
        changed = true;
    }
    if changed {
        progression.last_xp_update_at = Some(now);
    }
    changed
}

/// Awards XP for a freshly stored response. Returns the amount granted.
pub fn award_for_response(
    store: &Store,
    config: &XpConfig,
    response: &AnswerResponse,
) -> Result<u64, ExamError> {
    let award = xp_award(
        config,
        response.difficulty,
        response.is_correct,
        response.is_skipped,
        response.is_reattempt,
        response.time_spent_secs,
    );
    if award == 0 {
        return Ok(0);
    }
    let now = Utc::now();
    let updated =
        store.update_progression(&response.user_id, |p| apply_award(p, award, now, config))?;
    if let Some(progression) = updated {
        tracing::debug!(
            user_id = %response.user_id,
            award,
            xp = progression.xp,
            level = progression.level,
            "XP awarded"
        );
    }
    Ok(award)
}

/// Award step of response submission. The response is already stored at this point, so a
/// failed award is logged and reported as 0 XP instead of failing the request.
pub fn award_after_submit(store: &Store, config: &XpConfig, response: &AnswerResponse) -> u64 {
    match award_for_response(store, config, response) {
        Ok(award) => award,
        Err(e) => {
            tracing::error!(
                user_id = %response.user_id,
                response_id = %response.id,
                error = %e,
                "XP award failed for recorded response"
            );
            0
        }
    }
}

pub fn decay_user(
    store: &Store,
    config: &XpConfig,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, ExamError> {
    Ok(store
        .update_progression(user_id, |p| apply_decay(p, now, config))?
        .is_some())
}
