//! Diagnostic Assessment
//!
//! Short adaptive placement test for new learners. The fixed skill order is
//! traversed once (addition through word problems); each skill consumes
//! between 3 and 6 questions, exiting early on an unambiguous signal, so the
//! whole test always terminates within 15 to 30 answers. Completion emits a
//! [`DiagnosticResult`] carrying a fully bootstrapped [`LearnerState`].

use std::collections::HashSet;

use rand::Rng;

use crate::config::AssessmentParams;
use crate::selector::QuestionRepository;
use crate::tracker::weighted_mastery;
use crate::types::{
    AssessmentResponse, AssessmentState, DiagnosticResult, Difficulty, DifficultyMode,
    EstimatedLevel, LearnerState, Question, Skill, SkillAssessmentResult, SkillMap, Trend,
};

/// Divisor for the estimated grade level: always the full skill count, even
/// if a skill result had to be computed on the fly at finalization.
const GRADE_SKILL_DIVISOR: f64 = 5.0;

pub struct DiagnosticAssessment {
    params: AssessmentParams,
}

impl DiagnosticAssessment {
    pub fn new(params: AssessmentParams) -> Self {
        Self { params }
    }

    /// Starts a placement test on the first skill at the easy rung, with its
    /// opening question already generated.
    pub fn start<R: Rng + ?Sized>(
        &self,
        repo: &dyn QuestionRepository,
        rng: &mut R,
    ) -> AssessmentState {
        let skill = Skill::ALL[0];
        let question = self.generate_question(repo, skill, Difficulty::Easy, &HashSet::new(), rng);
        AssessmentState {
            current_skill: skill,
            skill_index: 0,
            questions_asked: 0,
            correct: 0,
            rung: Difficulty::Easy,
            responses: Vec::new(),
            results: SkillMap::from_fn(|_| None),
            complete: false,
            current_question: Some(question),
        }
    }

    /// Feeds one answer into the state machine and returns the next state.
    /// Answering a completed assessment is a no-op; an out-of-range answer
    /// index counts as incorrect.
    pub fn process_answer<R: Rng + ?Sized>(
        &self,
        state: &AssessmentState,
        repo: &dyn QuestionRepository,
        answer_index: usize,
        response_ms: i64,
        rng: &mut R,
    ) -> AssessmentState {
        if state.complete {
            return state.clone();
        }
        let Some(question) = state.current_question.as_ref() else {
            return state.clone();
        };

        let mut next = state.clone();
        let correct = question.is_correct(answer_index);
        next.responses.push(AssessmentResponse {
            skill: next.current_skill,
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            correct,
            response_ms,
        });
        next.questions_asked += 1;
        if correct {
            next.correct += 1;
        }

        if self.should_advance(next.correct, next.questions_asked) {
            self.advance_skill(&mut next, repo, rng);
        } else {
            next.rung = self.next_difficulty(next.correct, next.questions_asked, next.rung);
            let asked = asked_ids(&next.responses);
            next.current_question =
                Some(self.generate_question(repo, next.current_skill, next.rung, &asked, rng));
        }

        next
    }

    /// Exit-current-skill decision: never before the minimum, always at the
    /// maximum, early at the minimum on a 0% or 100% signal, otherwise at
    /// the base length.
    fn should_advance(&self, correct: i32, asked: i32) -> bool {
        if asked < self.params.min_questions {
            return false;
        }
        if asked >= self.params.max_questions {
            return true;
        }
        if correct == 0 || correct == asked {
            return true;
        }
        asked >= self.params.base_questions
    }

    fn advance_skill<R: Rng + ?Sized>(
        &self,
        state: &mut AssessmentState,
        repo: &dyn QuestionRepository,
        rng: &mut R,
    ) {
        let finished = state.current_skill;
        let result = self.calculate_result(finished, &state.responses);
        tracing::debug!(
            skill = finished.as_str(),
            asked = result.questions_asked,
            correct = result.correct,
            level = result.level.as_str(),
            "assessment skill finished"
        );
        state.results[finished] = Some(result);

        if state.skill_index + 1 >= Skill::ALL.len() {
            state.complete = true;
            state.current_question = None;
            tracing::debug!(answers = state.responses.len(), "assessment complete");
            return;
        }

        state.skill_index += 1;
        state.current_skill = Skill::ALL[state.skill_index];
        state.questions_asked = 0;
        state.correct = 0;
        state.rung = Difficulty::Easy;
        let asked = asked_ids(&state.responses);
        state.current_question =
            Some(self.generate_question(repo, state.current_skill, state.rung, &asked, rng));
    }

    /// Steps the rung up on strong accuracy and down on weak accuracy, one
    /// rung at a time.
    fn next_difficulty(&self, correct: i32, asked: i32, rung: Difficulty) -> Difficulty {
        if asked <= 0 {
            return rung;
        }
        let accuracy = correct as f64 / asked as f64;
        if accuracy >= self.params.step_up_accuracy && rung != Difficulty::Hard {
            rung.harder()
        } else if accuracy < self.params.step_down_accuracy && rung != Difficulty::Easy {
            rung.easier()
        } else {
            rung
        }
    }

    fn generate_question<R: Rng + ?Sized>(
        &self,
        repo: &dyn QuestionRepository,
        skill: Skill,
        rung: Difficulty,
        asked: &HashSet<String>,
        rng: &mut R,
    ) -> Question {
        let mut pool: Vec<Question> = repo
            .questions_for(skill, rung.repo_tier())
            .into_iter()
            .filter(|q| !asked.contains(&q.id))
            .collect();
        if pool.is_empty() {
            pool = repo.any_questions(asked);
        }

        let mut question = if pool.is_empty() {
            repo.fallback_question()
        } else {
            let idx = rng.gen_range(0..pool.len());
            pool.swap_remove(idx)
        };

        // The hard rung serves a medium-tier question; only the display
        // metadata marks it as above grade.
        if rung == Difficulty::Hard {
            question.grade_level = Some("above-grade".to_string());
        }
        question
    }

    /// Placement verdict for one skill from the responses logged so far.
    fn calculate_result(&self, skill: Skill, responses: &[AssessmentResponse]) -> SkillAssessmentResult {
        let of_skill: Vec<&AssessmentResponse> =
            responses.iter().filter(|r| r.skill == skill).collect();
        let total = of_skill.len() as i32;
        let correct = of_skill.iter().filter(|r| r.correct).count() as i32;
        let accuracy = if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        };

        let level = if accuracy >= 0.8 {
            EstimatedLevel::Above
        } else if accuracy >= 0.5 {
            EstimatedLevel::On
        } else {
            EstimatedLevel::Below
        };

        let mut confidence = (total * self.params.confidence_per_question).min(100);
        if accuracy == 0.0 || accuracy == 1.0 {
            confidence = confidence.min(self.params.extreme_confidence_cap);
        }

        let recommended_difficulty = if accuracy >= self.params.medium_start_accuracy {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        };

        let missed_examples = of_skill
            .iter()
            .filter(|r| !r.correct)
            .take(self.params.max_missed_examples)
            .map(|r| r.prompt.clone())
            .collect();

        SkillAssessmentResult {
            questions_asked: total,
            correct,
            level,
            confidence,
            recommended_difficulty,
            missed_examples,
        }
    }

    /// Builds the final placement outcome. Deterministic: calling this twice
    /// on the same state yields identical results.
    pub fn build_result(&self, state: &AssessmentState, now_ms: i64) -> DiagnosticResult {
        // Every skill gets a result even if a branch skipped its loop.
        let skills: SkillMap<SkillAssessmentResult> = SkillMap::from_fn(|skill| {
            state.results[skill]
                .clone()
                .unwrap_or_else(|| self.calculate_result(skill, &state.responses))
        });

        let below = skills.iter().filter(|(_, r)| r.level == EstimatedLevel::Below).count();
        let above = skills.iter().filter(|(_, r)| r.level == EstimatedLevel::Above).count();
        let overall_level = if below >= 3 {
            EstimatedLevel::Below
        } else if above >= 3 {
            EstimatedLevel::Above
        } else {
            EstimatedLevel::On
        };

        let overall_confidence = (skills.iter().map(|(_, r)| r.confidence as f64).sum::<f64>()
            / GRADE_SKILL_DIVISOR)
            .round() as i32;

        let estimated_grade = (skills.iter().map(|(_, r)| r.level.grade_score()).sum::<f64>()
            / GRADE_SKILL_DIVISOR
            * 10.0)
            .round()
            / 10.0;

        let mut focus_skill = Skill::ALL[0];
        for skill in Skill::ALL {
            if skills[skill].accuracy() < skills[focus_skill].accuracy() {
                focus_skill = skill;
            }
        }

        let recommended_world = match overall_level {
            EstimatedLevel::Above => 2,
            _ => 1,
        };

        let message = match overall_level {
            EstimatedLevel::Below => format!(
                "We'll start with the basics and build up your {} skills step by step. You've got this!",
                focus_skill.label()
            ),
            EstimatedLevel::On => format!(
                "You're right on track for your grade! Let's sharpen {} first.",
                focus_skill.label()
            ),
            EstimatedLevel::Above => format!(
                "Outstanding work! You're ready for bigger challenges. We'll keep {} sharp along the way.",
                focus_skill.label()
            ),
        };

        let learner_state = self.bootstrap_state(&skills, &state.responses, now_ms);

        DiagnosticResult {
            overall_level,
            overall_confidence,
            skills,
            recommended_world,
            focus_skill,
            message,
            estimated_grade,
            learner_state,
        }
    }

    /// Seeds a learner state from the assessment so regular practice starts
    /// from the measured baseline instead of the neutral prior.
    fn bootstrap_state(
        &self,
        skills: &SkillMap<SkillAssessmentResult>,
        responses: &[AssessmentResponse],
        now_ms: i64,
    ) -> LearnerState {
        let mut state = LearnerState::new();

        for skill in Skill::ALL {
            let result = &skills[skill];
            let mastery = &mut state.skills[skill];
            mastery.attempts = result.questions_asked;
            mastery.correct = result.correct;

            let outcomes: Vec<bool> = responses
                .iter()
                .filter(|r| r.skill == skill)
                .map(|r| r.correct)
                .collect();
            let start = outcomes.len().saturating_sub(crate::types::RECENT_WINDOW);
            mastery.recent = outcomes[start..].iter().copied().collect();
            mastery.mastery = weighted_mastery(&mastery.recent);
            mastery.trend = if result.level == EstimatedLevel::Below {
                Trend::Struggling
            } else {
                Trend::Stable
            };
        }

        let total = responses.len();
        let correct = responses.iter().filter(|r| r.correct).count();
        let overall_accuracy = if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        };
        state.mode = if overall_accuracy >= self.params.adaptive_mode_accuracy {
            DifficultyMode::Adaptive
        } else {
            DifficultyMode::Easy
        };
        state.last_session_ms = now_ms;
        state.total_play_ms = responses.iter().map(|r| r.response_ms).sum();

        state
    }
}

impl Default for DiagnosticAssessment {
    fn default() -> Self {
        Self::new(AssessmentParams::default())
    }
}

fn asked_ids(responses: &[AssessmentResponse]) -> HashSet<String> {
    responses.iter().map(|r| r.question_id.clone()).collect()
}
