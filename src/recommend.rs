//! Recommendation Summarizer
//!
//! Pure derivation from a learner snapshot: weakest and strongest skill plus
//! templated guidance keyed off the weak skill's mastery band and trend. The
//! encouragement line cycles randomly through a fixed set via the injected
//! rng so repeated summaries do not read identically.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{LearnerState, Skill, Trend};

const ENCOURAGEMENTS: [&str; 5] = [
    "Every question you try makes your math brain stronger!",
    "Mistakes are proof that you are trying. Keep going!",
    "Small steps every day add up to big leaps.",
    "You are closer to mastering this than you think.",
    "Great mathematicians practice a little every day, just like you.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub focus_skill: Skill,
    pub strongest_skill: Skill,
    pub recommendation: String,
    pub encouragement: String,
}

/// Skill with the lowest mastery; ties resolve to the earliest in the fixed
/// order.
pub fn weakest_skill(state: &LearnerState) -> Skill {
    let mut weakest = Skill::ALL[0];
    for skill in Skill::ALL {
        if state.skills[skill].mastery < state.skills[weakest].mastery {
            weakest = skill;
        }
    }
    weakest
}

pub fn strongest_skill(state: &LearnerState) -> Skill {
    let mut strongest = Skill::ALL[0];
    for skill in Skill::ALL {
        if state.skills[skill].mastery > state.skills[strongest].mastery {
            strongest = skill;
        }
    }
    strongest
}

pub fn summarize<R: Rng + ?Sized>(state: &LearnerState, rng: &mut R) -> Recommendation {
    let focus = weakest_skill(state);
    let strongest = strongest_skill(state);
    let mastery = &state.skills[focus];

    let mut recommendation = if mastery.mastery < 40 {
        format!(
            "Keep practicing {} with easy questions to build confidence.",
            focus.label()
        )
    } else if mastery.mastery < 70 {
        format!(
            "Mix in some medium {} questions. You're getting there!",
            focus.label()
        )
    } else {
        format!(
            "You have a great command of {}. Time to take on harder challenges!",
            focus.label()
        )
    };

    match mastery.trend {
        Trend::Struggling => {
            recommendation.push_str(" Short, regular practice sessions help the most.");
        }
        Trend::Improving => {
            recommendation.push_str(" You're trending up, so keep the streak going.");
        }
        Trend::Stable => {}
    }

    let encouragement = ENCOURAGEMENTS[rng.gen_range(0..ENCOURAGEMENTS.len())].to_string();

    Recommendation {
        focus_skill: focus,
        strongest_skill: strongest,
        recommendation,
        encouragement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state_with(values: &[(Skill, i32, Trend)]) -> LearnerState {
        let mut state = LearnerState::new();
        for &(skill, mastery, trend) in values {
            state.skills[skill].mastery = mastery;
            state.skills[skill].trend = trend;
            state.skills[skill].attempts = 5;
        }
        state
    }

    #[test]
    fn weakest_and_strongest_by_mastery() {
        let state = state_with(&[
            (Skill::Addition, 90, Trend::Stable),
            (Skill::Division, 25, Trend::Stable),
        ]);
        assert_eq!(weakest_skill(&state), Skill::Division);
        assert_eq!(strongest_skill(&state), Skill::Addition);
    }

    #[test]
    fn mastery_ties_resolve_to_encounter_order() {
        // All skills sit at the default 50.
        let state = LearnerState::new();
        assert_eq!(weakest_skill(&state), Skill::Addition);
        assert_eq!(strongest_skill(&state), Skill::Addition);
    }

    #[test]
    fn low_band_recommends_easy_practice() {
        let state = state_with(&[(Skill::WordProblem, 20, Trend::Stable)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rec = summarize(&state, &mut rng);
        assert_eq!(rec.focus_skill, Skill::WordProblem);
        assert!(rec.recommendation.contains("easy questions"), "{}", rec.recommendation);
    }

    #[test]
    fn struggling_trend_adds_pacing_advice() {
        let state = state_with(&[(Skill::Subtraction, 30, Trend::Struggling)]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let rec = summarize(&state, &mut rng);
        assert!(
            rec.recommendation.contains("Short, regular practice"),
            "{}",
            rec.recommendation
        );
    }

    #[test]
    fn encouragement_is_seed_deterministic() {
        let state = LearnerState::new();
        let a = summarize(&state, &mut ChaCha8Rng::seed_from_u64(7));
        let b = summarize(&state, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(ENCOURAGEMENTS.contains(&a.encouragement.as_str()));
    }
}
