//! Integration tests covering the full learner lifecycle: placement test,
//! bootstrapped tracker state, practice loop with the selector, and the
//! recommendation summary.

mod common;

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use common::StaticRepo;
use mathquest_engine::{
    summarize, DiagnosticAssessment, DiagnosticResult, DifficultyMode, EstimatedLevel,
    LearnerState, MasteryTracker, QuestionSelector, Skill, Trend,
};

fn run_assessment(
    assessment: &DiagnosticAssessment,
    repo: &StaticRepo,
    rng: &mut ChaCha8Rng,
    mut decide: impl FnMut(Skill) -> bool,
) -> DiagnosticResult {
    let mut state = assessment.start(repo, rng);
    while !state.complete {
        let question = state.current_question.clone().expect("incomplete state has a question");
        let answer = if decide(question.skill) {
            question.correct_index
        } else {
            question.correct_index + 1
        };
        state = assessment.process_answer(&state, repo, answer, 2500, rng);
    }
    assessment.build_result(&state, 1_000_000)
}

#[test]
fn placement_then_practice_lifecycle() {
    let repo = StaticRepo::new(12);
    let assessment = DiagnosticAssessment::default();
    let tracker = MasteryTracker::default();
    let selector = QuestionSelector::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    // Learner who knows addition/subtraction but misses everything else.
    let result = run_assessment(&assessment, &repo, &mut rng, |skill| {
        matches!(skill, Skill::Addition | Skill::Subtraction)
    });

    assert_eq!(result.overall_level, EstimatedLevel::Below, "three skills below");
    assert_eq!(result.recommended_world, 1);
    assert_eq!(result.skills[Skill::Addition].level, EstimatedLevel::Above);
    assert_eq!(result.skills[Skill::Division].level, EstimatedLevel::Below);
    assert!(matches!(
        result.focus_skill,
        Skill::Multiplication | Skill::Division | Skill::WordProblem
    ));

    // Bootstrapped state feeds straight into the practice loop.
    let mut learner = result.learner_state;
    assert_eq!(learner.mode, DifficultyMode::Easy, "overall accuracy below 0.7");
    assert_eq!(learner.skills[Skill::Division].trend, Trend::Struggling);

    let mut session_ids = HashSet::new();
    for step in 0..30 {
        let now_ms = 2_000_000 + step * 60_000;
        let question =
            selector.select_next(&learner, &repo, &session_ids, None, now_ms, &mut rng);
        assert!(session_ids.insert(question.id.clone()), "session ids must not repeat");

        // The learner has caught on; everything lands correct now.
        learner = tracker.record_outcome(&learner, &question, true, 2000, now_ms);
    }

    assert_eq!(learner.mode, DifficultyMode::Adaptive, "long correct streak promotes");
    assert_eq!(learner.consecutive_correct, 30);
    assert_eq!(learner.consecutive_wrong, 0);
    for skill in Skill::ALL {
        let mastery = learner.skills[skill].mastery;
        assert!((0..=100).contains(&mastery), "{}: {mastery}", skill.as_str());
    }
}

#[test]
fn practice_loop_biases_toward_weak_skills() {
    let repo = StaticRepo::new(30);
    let tracker = MasteryTracker::default();
    let selector = QuestionSelector::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    // Seed a learner with one weak skill via real outcomes.
    let mut learner = LearnerState::new();
    for skill in Skill::ALL {
        let correct = skill != Skill::Division;
        for question in repo.questions_for_seed(skill) {
            learner = tracker.record_outcome(&learner, &question, correct, 3000, 100);
        }
    }
    assert!(learner.skills[Skill::Division].mastery < learner.skills[Skill::Addition].mastery);

    let mut division_hits = 0;
    let trials = 600;
    for _ in 0..trials {
        let q = selector.select_next(&learner, &repo, &HashSet::new(), None, 200_000, &mut rng);
        if q.skill == Skill::Division {
            division_hits += 1;
        }
    }
    let ratio = division_hits as f64 / trials as f64;
    assert!(ratio > 0.6, "weak skill should dominate selection, got {ratio}");
}

#[test]
fn summary_tracks_the_weak_skill_after_practice() {
    let repo = StaticRepo::new(8);
    let tracker = MasteryTracker::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let mut learner = LearnerState::new();
    for question in repo.questions_for_seed(Skill::Multiplication) {
        learner = tracker.record_outcome(&learner, &question, false, 5000, 50);
    }
    for question in repo.questions_for_seed(Skill::Addition) {
        learner = tracker.record_outcome(&learner, &question, true, 1500, 60);
    }

    let rec = summarize(&learner, &mut rng);
    assert_eq!(rec.focus_skill, Skill::Multiplication);
    assert_eq!(rec.strongest_skill, Skill::Addition);
    assert!(!rec.recommendation.is_empty());
    assert!(!rec.encouragement.is_empty());
}

#[test]
fn diagnostic_result_serde_round_trip() {
    let repo = StaticRepo::new(10);
    let assessment = DiagnosticAssessment::default();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let result = run_assessment(&assessment, &repo, &mut rng, |skill| {
        skill != Skill::WordProblem
    });

    let json = serde_json::to_string(&result).unwrap();
    let back: DiagnosticResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

trait SeedQuestions {
    fn questions_for_seed(&self, skill: Skill) -> Vec<mathquest_engine::Question>;
}

impl SeedQuestions for StaticRepo {
    fn questions_for_seed(&self, skill: Skill) -> Vec<mathquest_engine::Question> {
        use mathquest_engine::{Difficulty, QuestionRepository};
        let mut qs = self.questions_for(skill, Difficulty::Easy);
        qs.truncate(6);
        qs
    }
}
