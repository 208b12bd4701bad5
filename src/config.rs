use serde::{Deserialize, Serialize};

/// Skill Mastery Tracker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerParams {
    /// Recent-outcomes window per skill; oldest entries evicted FIFO.
    pub recent_window: usize,
    /// Below this many recent outcomes the trend is always stable.
    pub trend_min_samples: usize,
    /// Half-split mean delta beyond which the trend leaves stable.
    pub trend_threshold: f64,
    /// Consecutive correct answers that promote easy mode to adaptive.
    pub promote_streak: i32,
    /// Consecutive wrong answers that demote any non-easy mode to easy.
    pub demote_streak: i32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            recent_window: 10,
            trend_min_samples: 4,
            trend_threshold: 0.15,
            promote_streak: 5,
            demote_streak: 3,
        }
    }
}

/// Adaptive Question Selector scoring weights. All bonuses are additive on
/// top of `base_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorParams {
    pub base_score: f64,
    /// Probability of targeting the weakest attempted skill (the remainder
    /// picks uniformly among attempted skills).
    pub weak_skill_bias: f64,
    /// Bonus for questions never attempted before.
    pub novelty_bonus: f64,
    /// Missed 1-24 hours ago: prime spaced-repetition window.
    pub missed_recent_bonus: f64,
    /// Missed at least a day ago.
    pub missed_stale_bonus: f64,
    /// Answered correctly less than a day ago.
    pub correct_recent_penalty: f64,
    /// Answered correctly at least three days ago: refresher window.
    pub refresher_bonus: f64,
    /// Per-question accuracy below one half.
    pub low_accuracy_bonus: f64,
    /// Mastery band cutoffs.
    pub low_mastery_cut: i32,
    pub high_mastery_cut: i32,
    /// Difficulty-matching bonuses per (band, tier).
    pub low_band_easy: f64,
    pub low_band_medium: f64,
    pub mid_band_easy: f64,
    pub mid_band_medium: f64,
    pub high_band_easy: f64,
    pub high_band_medium: f64,
    /// Trend adjustments.
    pub struggling_easy_bonus: f64,
    pub improving_medium_bonus: f64,
    /// Upper bound (exclusive) of the uniform tie-breaking jitter.
    pub jitter: f64,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            base_score: 100.0,
            weak_skill_bias: 0.7,
            novelty_bonus: 20.0,
            missed_recent_bonus: 50.0,
            missed_stale_bonus: 30.0,
            correct_recent_penalty: -40.0,
            refresher_bonus: 10.0,
            low_accuracy_bonus: 30.0,
            low_mastery_cut: 50,
            high_mastery_cut: 75,
            low_band_easy: 40.0,
            low_band_medium: -20.0,
            mid_band_easy: 10.0,
            mid_band_medium: 20.0,
            high_band_easy: -10.0,
            high_band_medium: 30.0,
            struggling_easy_bonus: 20.0,
            improving_medium_bonus: 15.0,
            jitter: 20.0,
        }
    }
}

/// Diagnostic assessment tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentParams {
    /// Never advance a skill before this many questions.
    pub min_questions: i32,
    /// Advance at this many questions unless the signal is ambiguous.
    pub base_questions: i32,
    /// Always advance at this many questions.
    pub max_questions: i32,
    /// Per-skill accuracy at or above which the rung steps up.
    pub step_up_accuracy: f64,
    /// Per-skill accuracy below which the rung steps down.
    pub step_down_accuracy: f64,
    /// Confidence granted per question asked.
    pub confidence_per_question: i32,
    /// Confidence cap applied to perfect/zero accuracy; small samples with
    /// extreme scores are statistically less trustworthy.
    pub extreme_confidence_cap: i32,
    /// Accuracy at or above which a skill starts on medium questions.
    pub medium_start_accuracy: f64,
    /// Overall accuracy at or above which the bootstrapped state starts in
    /// adaptive mode.
    pub adaptive_mode_accuracy: f64,
    /// Missed prompts recorded per skill as weakness examples.
    pub max_missed_examples: usize,
}

impl Default for AssessmentParams {
    fn default() -> Self {
        Self {
            min_questions: 3,
            base_questions: 4,
            max_questions: 6,
            step_up_accuracy: 0.8,
            step_down_accuracy: 0.4,
            confidence_per_question: 20,
            extreme_confidence_cap: 70,
            medium_start_accuracy: 0.7,
            adaptive_mode_accuracy: 0.7,
            max_missed_examples: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub tracker: TrackerParams,
    pub selector: SelectorParams,
    pub assessment: AssessmentParams,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MATHQUEST_TREND_THRESHOLD") {
            if let Ok(parsed) = val.parse() {
                config.tracker.trend_threshold = parsed;
            }
        }
        if let Ok(val) = std::env::var("MATHQUEST_WEAK_SKILL_BIAS") {
            if let Ok(parsed) = val.parse::<f64>() {
                config.selector.weak_skill_bias = parsed.clamp(0.0, 1.0);
            }
        }
        if let Ok(val) = std::env::var("MATHQUEST_MAX_QUESTIONS") {
            if let Ok(parsed) = val.parse::<i32>() {
                config.assessment.max_questions = parsed.max(config.assessment.min_questions);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.tracker.recent_window, 10);
        assert_eq!(config.tracker.trend_min_samples, 4);
        assert!((config.tracker.trend_threshold - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.tracker.promote_streak, 5);
        assert_eq!(config.tracker.demote_streak, 3);
        assert_eq!(config.assessment.min_questions, 3);
        assert_eq!(config.assessment.base_questions, 4);
        assert_eq!(config.assessment.max_questions, 6);
        assert_eq!(config.assessment.extreme_confidence_cap, 70);
        assert!((config.selector.weak_skill_bias - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn config_json_round_trip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert!((back.selector.base_score - config.selector.base_score).abs() < f64::EPSILON);
        assert_eq!(back.assessment.max_questions, config.assessment.max_questions);
    }
}
