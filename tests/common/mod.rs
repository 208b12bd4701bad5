//! Shared test fixtures: a deterministic in-memory question repository.
#![allow(dead_code)]

use std::collections::HashSet;

use mathquest_engine::{Difficulty, Question, QuestionRepository, Skill};

pub struct StaticRepo {
    questions: Vec<Question>,
}

impl StaticRepo {
    /// Bank with `per_tier` questions for every (skill, tier) pair.
    pub fn new(per_tier: usize) -> Self {
        let mut questions = Vec::new();
        for skill in Skill::ALL {
            for tier in [Difficulty::Easy, Difficulty::Medium] {
                for n in 0..per_tier {
                    questions.push(Question {
                        id: format!("{}-{}-{n}", skill.as_str(), tier.as_str()),
                        prompt: format!("{} {} question {n}", skill.as_str(), tier.as_str()),
                        answers: vec![1, 2, 3, 4],
                        correct_index: n % 4,
                        skill,
                        difficulty: tier,
                        hint: (n % 2 == 0).then(|| format!("hint for {n}")),
                        grade_level: None,
                    });
                }
            }
        }
        Self { questions }
    }

    pub fn ids_for(&self, skill: Skill) -> HashSet<String> {
        self.questions
            .iter()
            .filter(|q| q.skill == skill)
            .map(|q| q.id.clone())
            .collect()
    }
}

impl QuestionRepository for StaticRepo {
    fn questions_for(&self, skill: Skill, difficulty: Difficulty) -> Vec<Question> {
        let tier = difficulty.repo_tier();
        self.questions
            .iter()
            .filter(|q| q.skill == skill && q.difficulty == tier)
            .cloned()
            .collect()
    }

    fn any_questions(&self, exclude: &HashSet<String>) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| !exclude.contains(&q.id))
            .cloned()
            .collect()
    }

    fn fallback_question(&self) -> Question {
        Question {
            id: "fallback".into(),
            prompt: "1 + 1".into(),
            answers: vec![2, 3],
            correct_index: 0,
            skill: Skill::Addition,
            difficulty: Difficulty::Easy,
            hint: None,
            grade_level: None,
        }
    }
}
