//! Adaptive Question Selector
//!
//! Picks the single best next practice question for a learner snapshot: bias
//! toward the weakest skill, resurface recently-missed items on a spaced
//! schedule, and match difficulty to demonstrated mastery while keeping a
//! random exploration slice. The only randomness (the 70/30 skill choice and
//! the tie-breaking jitter) comes from the injected rng, so tests can seed it.

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::Rng;

use crate::config::SelectorParams;
use crate::types::{Difficulty, LearnerState, Question, Skill, Trend};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Question content provider. The engine never mutates returned questions
/// and never fails on an empty result: the fallback chain ends at
/// [`fallback_question`](QuestionRepository::fallback_question).
pub trait QuestionRepository {
    /// All questions tagged with `skill` at the given tier. The repository
    /// only understands the easy and medium tiers.
    fn questions_for(&self, skill: Skill, difficulty: Difficulty) -> Vec<Question>;

    /// Any non-excluded questions, used when a skill pool is exhausted.
    fn any_questions(&self, exclude: &HashSet<String>) -> Vec<Question>;

    /// Last-resort default when even `any_questions` comes back empty.
    fn fallback_question(&self) -> Question;
}

pub struct QuestionSelector {
    params: SelectorParams,
}

impl QuestionSelector {
    pub fn new(params: SelectorParams) -> Self {
        Self { params }
    }

    /// Returns the highest-scoring candidate for the learner. Never returns
    /// a question whose id is in `excluded`, as long as the repository can
    /// offer any alternative.
    pub fn select_next<R: Rng + ?Sized>(
        &self,
        state: &LearnerState,
        repo: &dyn QuestionRepository,
        excluded: &HashSet<String>,
        forced_skill: Option<Skill>,
        now_ms: i64,
        rng: &mut R,
    ) -> Question {
        let target = forced_skill.unwrap_or_else(|| self.choose_skill(state, rng));

        let mut candidates: Vec<Question> = [Difficulty::Easy, Difficulty::Medium]
            .into_iter()
            .flat_map(|tier| repo.questions_for(target, tier))
            .filter(|q| !excluded.contains(&q.id))
            .collect();

        if candidates.is_empty() {
            candidates = repo.any_questions(excluded);
        }
        if candidates.is_empty() {
            return repo.fallback_question();
        }

        let mut scored: Vec<(Question, f64)> = candidates
            .into_iter()
            .map(|q| {
                let score =
                    self.score(state, &q, now_ms) + rng.gen_range(0.0..self.params.jitter);
                (q, score)
            })
            .collect();

        // Stable sort: exact ties resolve to the first encountered.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let (question, score) = scored.swap_remove(0);
        tracing::debug!(
            skill = target.as_str(),
            question = %question.id,
            score,
            "selected next question"
        );
        question
    }

    /// 70/30 weakest-vs-uniform choice over skills with at least one
    /// attempt; a brand-new learner starts on addition.
    fn choose_skill<R: Rng + ?Sized>(&self, state: &LearnerState, rng: &mut R) -> Skill {
        let attempted: Vec<Skill> = Skill::ALL
            .into_iter()
            .filter(|&s| state.skills[s].attempts > 0)
            .collect();

        if attempted.is_empty() {
            return Skill::Addition;
        }

        if rng.gen_bool(self.params.weak_skill_bias) {
            let mut weakest = attempted[0];
            for &skill in &attempted[1..] {
                if state.skills[skill].mastery < state.skills[weakest].mastery {
                    weakest = skill;
                }
            }
            weakest
        } else {
            attempted[rng.gen_range(0..attempted.len())]
        }
    }

    /// Deterministic part of the candidate score (everything but jitter).
    fn score(&self, state: &LearnerState, question: &Question, now_ms: i64) -> f64 {
        let p = &self.params;
        let mut score = p.base_score;

        match state.questions.get(&question.id) {
            None => score += p.novelty_bonus,
            Some(stats) => {
                let elapsed = now_ms - stats.last_attempted_ms;
                if stats.last_correct {
                    if elapsed < DAY_MS {
                        score += p.correct_recent_penalty;
                    } else if elapsed >= 3 * DAY_MS {
                        score += p.refresher_bonus;
                    }
                } else if elapsed >= HOUR_MS && elapsed < DAY_MS {
                    score += p.missed_recent_bonus;
                } else if elapsed >= DAY_MS {
                    score += p.missed_stale_bonus;
                }
                if stats.accuracy() < 0.5 {
                    score += p.low_accuracy_bonus;
                }
            }
        }

        // Difficulty matching against the candidate's own skill; the skill
        // map is total, so a never-attempted skill scores at the neutral 50.
        let mastery = state.skills[question.skill].mastery;
        let easy = question.difficulty.repo_tier() == Difficulty::Easy;
        score += if mastery < p.low_mastery_cut {
            if easy { p.low_band_easy } else { p.low_band_medium }
        } else if mastery < p.high_mastery_cut {
            if easy { p.mid_band_easy } else { p.mid_band_medium }
        } else if easy {
            p.high_band_easy
        } else {
            p.high_band_medium
        };

        match state.skills[question.skill].trend {
            Trend::Struggling if easy => score += p.struggling_easy_bonus,
            Trend::Improving if !easy => score += p.improving_medium_bonus,
            _ => {}
        }

        score
    }
}

impl Default for QuestionSelector {
    fn default() -> Self {
        Self::new(SelectorParams::default())
    }
}
