//! The question bank collaborator contract.
//!
//! The engine only needs correctness comparison per question kind; rendering
//! and math content are opaque payload. Multiple-choice answers compare by
//! option index, free-response by exact string equality, and proof-style
//! questions by a passcode handed out after offline review -- the passcode
//! is the sole correctness oracle, no semantic grading happens here.

use crate::id::QuestionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Question types
// ---------------------------------------------------------------------------

/// How a question is answered and checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Pick one option; correct iff the submitted index matches.
    MultipleChoice { options: Vec<String>, correct: usize },

    /// Type an answer; correct iff exactly equal to the canonical string.
    FreeResponse { correct: String },

    /// Proof-style work reviewed offline; a judge hands out the passcode.
    Proof { passcode: String },
}

/// One entry in the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,

    /// Prompt text, possibly containing math markup. Opaque to the engine.
    pub prompt: String,

    /// Curriculum category (Knowledge, Application, ...). Opaque payload.
    pub category: Option<String>,

    pub kind: QuestionKind,

    /// Worked solution shown by the answer-review feature after purchase.
    pub solution: Option<String>,
}

/// A submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// Selected option index for multiple choice.
    Choice(usize),

    /// Typed text for free response and proof passcodes.
    Text(String),
}

impl Question {
    /// Exact-equality correctness check. A mismatched answer shape (e.g. an
    /// option index for a free-response question) is simply wrong.
    pub fn check(&self, answer: &Answer) -> bool {
        match (&self.kind, answer) {
            (QuestionKind::MultipleChoice { correct, .. }, Answer::Choice(picked)) => {
                picked == correct
            }
            (QuestionKind::FreeResponse { correct }, Answer::Text(text)) => text == correct,
            (QuestionKind::Proof { passcode }, Answer::Text(text)) => text == passcode,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// QuestionBank
// ---------------------------------------------------------------------------

/// Errors that can occur while building a question bank.
#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

/// The question bank: immutable after startup, keyed by question id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: HashMap<QuestionId, Question>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: Question) -> Result<(), QuestionBankError> {
        if self.questions.contains_key(&question.id) {
            return Err(QuestionBankError::DuplicateId(question.id));
        }
        self.questions.insert(question.id.clone(), question);
        Ok(())
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
