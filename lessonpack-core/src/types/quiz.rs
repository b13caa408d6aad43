//! Quiz types and their structural invariants

use super::ChapterId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every question has exactly this many answer options
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,

    /// Index into `options`, in `0..OPTION_COUNT`
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

/// Why a question was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("expected 4 options, found {0}")]
    WrongOptionCount(usize),

    #[error("correct answer index {0} is out of range")]
    AnswerOutOfRange(usize),
}

impl QuizQuestion {
    pub fn new(
        id: u64,
        question: impl Into<String>,
        options: [&str; OPTION_COUNT],
        correct_answer: usize,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
            explanation: String::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Check the option count and answer index
    pub fn validate(&self) -> Result<(), QuestionDefect> {
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionDefect::WrongOptionCount(self.options.len()));
        }
        if self.correct_answer >= OPTION_COUNT {
            return Err(QuestionDefect::AnswerOutOfRange(self.correct_answer));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// The quiz attached to a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub chapter_id: ChapterId,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(chapter_id: ChapterId) -> Self {
        Self {
            chapter_id,
            questions: Vec::new(),
        }
    }

    pub fn with_question(mut self, question: QuizQuestion) -> Self {
        self.questions.push(question);
        self
    }

    /// Drop invalid questions, returning the id and defect of each one removed
    pub fn retain_valid(&mut self) -> Vec<(u64, QuestionDefect)> {
        let mut dropped = Vec::new();
        self.questions.retain(|q| match q.validate() {
            Ok(()) => true,
            Err(defect) => {
                dropped.push((q.id, defect));
                false
            }
        });
        dropped
    }
}
