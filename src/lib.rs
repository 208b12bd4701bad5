//! # mathquest-engine
//!
//! Adaptive learning and diagnostic assessment core for a math-practice
//! game. The engine tracks per-skill mastery over time, selects the single
//! best next practice question, and runs a short adaptive placement test
//! that bootstraps the tracker for new learners.
//!
//! Design rules:
//! - **Pure and synchronous** - every operation maps (snapshot, event) to a
//!   new snapshot; no I/O, no hidden globals, no shared mutable state.
//! - **Seedable randomness** - the only non-determinism (selection jitter
//!   and the 70/30 skill choice) comes from an injected [`rand::Rng`].
//! - **No fatal errors** - empty pools, missing history, and malformed
//!   answer indices all degrade to safe defaults.
//!
//! Hosts drive the engine through five entry points: `record_outcome`,
//! `select_next`, `start`, `process_answer`, and `build_result`. Question
//! content comes from a host-supplied [`QuestionRepository`].

pub mod assessment;
pub mod config;
pub mod recommend;
pub mod selector;
pub mod tracker;
pub mod types;

pub use assessment::DiagnosticAssessment;
pub use config::{AssessmentParams, EngineConfig, SelectorParams, TrackerParams};
pub use recommend::{strongest_skill, summarize, weakest_skill, Recommendation};
pub use selector::{QuestionRepository, QuestionSelector};
pub use tracker::{weighted_mastery, MasteryTracker};
pub use types::{
    AssessmentResponse, AssessmentState, DiagnosticResult, Difficulty, DifficultyMode,
    EstimatedLevel, LearnerState, Question, QuestionStats, Skill, SkillAssessmentResult, SkillMap,
    SkillMastery, Trend,
};
