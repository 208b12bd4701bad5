//! Skill Mastery Tracker
//!
//! Maintains per-skill recency-weighted mastery and trend, per-question
//! outcome history, and the easy/adaptive difficulty-mode debounce. Every
//! update is a pure function: the previous snapshot is cloned, adjusted, and
//! returned; the caller keeps ownership of both.

use std::collections::VecDeque;

use crate::config::TrackerParams;
use crate::types::{DifficultyMode, LearnerState, Question, Trend};

pub struct MasteryTracker {
    params: TrackerParams,
}

impl MasteryTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self { params }
    }

    /// Records one answered question and returns the updated snapshot.
    ///
    /// `now_ms` is the caller's clock so the tracker itself stays
    /// deterministic; hosts typically pass
    /// [`LearnerState::now_ms`](crate::types::LearnerState::now_ms).
    pub fn record_outcome(
        &self,
        state: &LearnerState,
        question: &Question,
        correct: bool,
        response_ms: i64,
        now_ms: i64,
    ) -> LearnerState {
        let mut next = state.clone();

        let stats = next.questions.entry(question.id.clone()).or_default();
        stats.attempts += 1;
        if correct {
            stats.correct += 1;
        }
        let n = stats.attempts as f64;
        stats.avg_response_ms = (stats.avg_response_ms * (n - 1.0) + response_ms as f64) / n;
        stats.last_attempted_ms = now_ms;
        stats.last_correct = correct;

        let mastery = &mut next.skills[question.skill];
        mastery.attempts += 1;
        if correct {
            mastery.correct += 1;
        }
        mastery.recent.push_back(correct);
        while mastery.recent.len() > self.params.recent_window {
            mastery.recent.pop_front();
        }
        mastery.mastery = weighted_mastery(&mastery.recent);
        mastery.trend = self.classify_trend(&mastery.recent);

        if correct {
            next.consecutive_correct += 1;
            next.consecutive_wrong = 0;
        } else {
            next.consecutive_wrong += 1;
            next.consecutive_correct = 0;
        }

        // Two-state debounce: the only mode transitions that exist.
        if next.mode == DifficultyMode::Easy
            && next.consecutive_correct >= self.params.promote_streak
        {
            tracing::debug!(
                streak = next.consecutive_correct,
                "promoting difficulty mode easy -> adaptive"
            );
            next.mode = DifficultyMode::Adaptive;
        } else if next.mode != DifficultyMode::Easy
            && next.consecutive_wrong >= self.params.demote_streak
        {
            tracing::debug!(
                streak = next.consecutive_wrong,
                from = next.mode.as_str(),
                "demoting difficulty mode to easy"
            );
            next.mode = DifficultyMode::Easy;
        }

        next.last_session_ms = now_ms;
        next.total_play_ms += response_ms;

        next
    }

    /// Under `trend_min_samples` outcomes the trend is always stable;
    /// otherwise the window is split at its midpoint and the half means are
    /// compared against `trend_threshold`.
    fn classify_trend(&self, recent: &VecDeque<bool>) -> Trend {
        if recent.len() < self.params.trend_min_samples {
            return Trend::Stable;
        }

        let mid = recent.len() / 2;
        let first: f64 = recent.iter().take(mid).map(|&c| c as u8 as f64).sum::<f64>() / mid as f64;
        let second: f64 = recent.iter().skip(mid).map(|&c| c as u8 as f64).sum::<f64>()
            / (recent.len() - mid) as f64;

        let delta = second - first;
        if delta > self.params.trend_threshold {
            Trend::Improving
        } else if delta < -self.params.trend_threshold {
            Trend::Struggling
        } else {
            Trend::Stable
        }
    }
}

impl Default for MasteryTracker {
    fn default() -> Self {
        Self::new(TrackerParams::default())
    }
}

/// Recency-weighted mastery over the retained window: the i-th oldest
/// outcome carries weight `i + 1`, so the newest answer dominates. An empty
/// window scores the neutral 50 (unknown = assume average).
pub fn weighted_mastery(recent: &VecDeque<bool>) -> i32 {
    if recent.is_empty() {
        return 50;
    }

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (i, &correct) in recent.iter().enumerate() {
        let weight = (i + 1) as f64;
        total += weight;
        if correct {
            weighted += weight;
        }
    }

    (100.0 * weighted / total).round() as i32
}
