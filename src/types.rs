use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::ops::{Index, IndexMut};

/// Number of recent outcomes retained per skill. Oldest entries are evicted
/// FIFO once the window is full.
pub const RECENT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Skill {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    WordProblem,
}

impl Skill {
    /// Fixed encounter order. The diagnostic assessment traverses this order
    /// once; selector tie-breaks resolve to the earliest entry.
    pub const ALL: [Skill; 5] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::WordProblem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::WordProblem => "word-problem",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "subtraction" => Self::Subtraction,
            "multiplication" => Self::Multiplication,
            "division" => Self::Division,
            "word-problem" | "word_problem" => Self::WordProblem,
            _ => Self::Addition,
        }
    }

    /// Display label for player-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::WordProblem => "word problems",
        }
    }
}

/// Total map keyed by [`Skill`]: every skill always has an entry, so lookups
/// never need a null branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMap<T> {
    pub addition: T,
    pub subtraction: T,
    pub multiplication: T,
    pub division: T,
    #[serde(rename = "word-problem")]
    pub word_problem: T,
}

impl<T> SkillMap<T> {
    pub fn from_fn(mut f: impl FnMut(Skill) -> T) -> Self {
        Self {
            addition: f(Skill::Addition),
            subtraction: f(Skill::Subtraction),
            multiplication: f(Skill::Multiplication),
            division: f(Skill::Division),
            word_problem: f(Skill::WordProblem),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, &T)> {
        Skill::ALL.iter().map(move |&s| (s, &self[s]))
    }
}

impl<T> Index<Skill> for SkillMap<T> {
    type Output = T;

    fn index(&self, skill: Skill) -> &T {
        match skill {
            Skill::Addition => &self.addition,
            Skill::Subtraction => &self.subtraction,
            Skill::Multiplication => &self.multiplication,
            Skill::Division => &self.division,
            Skill::WordProblem => &self.word_problem,
        }
    }
}

impl<T> IndexMut<Skill> for SkillMap<T> {
    fn index_mut(&mut self, skill: Skill) -> &mut T {
        match skill {
            Skill::Addition => &mut self.addition,
            Skill::Subtraction => &mut self.subtraction,
            Skill::Multiplication => &mut self.multiplication,
            Skill::Division => &mut self.division,
            Skill::WordProblem => &mut self.word_problem,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn harder(&self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            _ => Self::Hard,
        }
    }

    pub fn easier(&self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            _ => Self::Easy,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "medium" | "mid" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Easy,
        }
    }

    /// The repository has no dedicated hard tier; a hard rung draws from the
    /// medium pool and only the grade-level metadata differs.
    pub fn repo_tier(&self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum DifficultyMode {
    #[default]
    Easy,
    Medium,
    Adaptive,
}

impl DifficultyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Adaptive => "adaptive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Trend {
    Improving,
    #[default]
    Stable,
    Struggling,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Struggling => "struggling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum EstimatedLevel {
    Below,
    #[default]
    On,
    Above,
}

impl EstimatedLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Below => "below",
            Self::On => "on",
            Self::Above => "above",
        }
    }

    /// Numeric grade score used when averaging into an estimated grade level.
    pub fn grade_score(&self) -> f64 {
        match self {
            Self::Below => 2.0,
            Self::On => 3.0,
            Self::Above => 4.0,
        }
    }
}

/// A practice question as produced by the question repository. Immutable
/// once produced; the engine never mutates repository content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub answers: Vec<i64>,
    pub correct_index: usize,
    pub skill: Skill,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Cosmetic display metadata attached by the assessment when a hard rung
    /// degrades to a medium-tier question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
}

impl Question {
    /// An out-of-range index is simply not the correct index, so malformed
    /// host input degrades to "incorrect" rather than an error.
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_index
    }
}

/// Per-question outcome history. Grows monotonically within a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub attempts: i32,
    pub correct: i32,
    pub last_attempted_ms: i64,
    pub last_correct: bool,
    pub avg_response_ms: f64,
}

impl QuestionStats {
    pub fn accuracy(&self) -> f64 {
        if self.attempts <= 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64
    }
}

/// Per-skill mastery record: totals plus a bounded recent-outcomes window
/// and the score/trend derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMastery {
    pub attempts: i32,
    pub correct: i32,
    /// Most recent outcome last; capped at [`RECENT_WINDOW`].
    pub recent: VecDeque<bool>,
    /// Recency-weighted score in 0..=100. Unknown defaults to 50.
    pub mastery: i32,
    pub trend: Trend,
}

impl Default for SkillMastery {
    fn default() -> Self {
        Self {
            attempts: 0,
            correct: 0,
            recent: VecDeque::with_capacity(RECENT_WINDOW),
            mastery: 50,
            trend: Trend::Stable,
        }
    }
}

impl SkillMastery {
    pub fn accuracy(&self) -> f64 {
        if self.attempts <= 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64
    }
}

/// The aggregate learner snapshot. Updated only by
/// [`MasteryTracker::record_outcome`](crate::tracker::MasteryTracker::record_outcome),
/// which returns a new value and leaves the previous snapshot untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerState {
    pub skills: SkillMap<SkillMastery>,
    pub questions: HashMap<String, QuestionStats>,
    pub mode: DifficultyMode,
    pub consecutive_correct: i32,
    pub consecutive_wrong: i32,
    pub last_session_ms: i64,
    pub total_play_ms: i64,
}

impl LearnerState {
    /// Fresh learner: every mastery at the neutral 50/stable prior, easy mode.
    pub fn new() -> Self {
        Self {
            skills: SkillMap::from_fn(|_| SkillMastery::default()),
            questions: HashMap::new(),
            mode: DifficultyMode::Easy,
            consecutive_correct: 0,
            consecutive_wrong: 0,
            last_session_ms: 0,
            total_play_ms: 0,
        }
    }

    pub fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl Default for LearnerState {
    fn default() -> Self {
        Self::new()
    }
}

/// One answered question inside a diagnostic assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub skill: Skill,
    pub question_id: String,
    pub prompt: String,
    pub correct: bool,
    pub response_ms: i64,
}

/// Placement verdict for a single skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAssessmentResult {
    pub questions_asked: i32,
    pub correct: i32,
    pub level: EstimatedLevel,
    /// 0..=100; capped at 70 for perfect/zero accuracy at small sample size.
    pub confidence: i32,
    pub recommended_difficulty: Difficulty,
    /// Up to 3 missed prompts, recorded verbatim.
    pub missed_examples: Vec<String>,
}

impl SkillAssessmentResult {
    pub fn accuracy(&self) -> f64 {
        if self.questions_asked <= 0 {
            return 0.0;
        }
        self.correct as f64 / self.questions_asked as f64
    }
}

/// Transient placement-test state. Exists only between
/// [`DiagnosticAssessment::start`](crate::assessment::DiagnosticAssessment::start)
/// and the [`DiagnosticResult`] built at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentState {
    pub current_skill: Skill,
    pub skill_index: usize,
    pub questions_asked: i32,
    pub correct: i32,
    pub rung: Difficulty,
    pub responses: Vec<AssessmentResponse>,
    pub results: SkillMap<Option<SkillAssessmentResult>>,
    pub complete: bool,
    pub current_question: Option<Question>,
}

/// Final placement outcome, including a fully bootstrapped learner state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub overall_level: EstimatedLevel,
    pub overall_confidence: i32,
    pub skills: SkillMap<SkillAssessmentResult>,
    pub recommended_world: i32,
    pub focus_skill: Skill,
    pub message: String,
    pub estimated_grade: f64,
    pub learner_state: LearnerState,
}
