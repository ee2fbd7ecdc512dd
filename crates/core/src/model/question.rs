use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised while building question values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,
    #[error("question text cannot be empty")]
    EmptyText,
    #[error("answer text for {0} cannot be empty")]
    EmptyAnswer(SlotTag),
    #[error("options are not a permutation of the question's answers")]
    NotAPermutation,
    #[error("invalid slot tag: {0}")]
    InvalidSlot(String),
}

//
// ─── SLOT TAG ─────────────────────────────────────────────────────────────────
//

/// Original position of an answer inside its question record.
///
/// The question store always places the correct answer in `Answer1`; the
/// tag travels with each shuffled option so correctness can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotTag {
    Answer1,
    Answer2,
    Answer3,
}

impl SlotTag {
    /// All tags in source order.
    pub const ALL: [SlotTag; 3] = [SlotTag::Answer1, SlotTag::Answer2, SlotTag::Answer3];

    /// The slot holding the authoritative answer for every question.
    pub const CORRECT: SlotTag = SlotTag::Answer1;

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SlotTag::Answer1 => "answer1",
            SlotTag::Answer2 => "answer2",
            SlotTag::Answer3 => "answer3",
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        self == Self::CORRECT
    }

    fn index(self) -> usize {
        match self {
            SlotTag::Answer1 => 0,
            SlotTag::Answer2 => 1,
            SlotTag::Answer3 => 2,
        }
    }
}

impl fmt::Display for SlotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotTag {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "answer1" => Ok(SlotTag::Answer1),
            "answer2" => Ok(SlotTag::Answer2),
            "answer3" => Ok(SlotTag::Answer3),
            other => Err(QuestionError::InvalidSlot(other.to_string())),
        }
    }
}

//
// ─── QUESTION RECORD ──────────────────────────────────────────────────────────
//

/// Raw question as returned by the question store.
///
/// Immutable once built; downstream code only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    id: QuestionId,
    question: String,
    answers: [String; 3],
}

impl QuestionRecord {
    /// Build a record from the store's three answers in source order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id, question text, or any answer is blank.
    pub fn new(
        id: QuestionId,
        question: impl Into<String>,
        answers: [String; 3],
    ) -> Result<Self, QuestionError> {
        let question = question.into();
        if id.is_blank() {
            return Err(QuestionError::EmptyId);
        }
        if question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        for tag in SlotTag::ALL {
            if answers[tag.index()].trim().is_empty() {
                return Err(QuestionError::EmptyAnswer(tag));
            }
        }

        Ok(Self {
            id,
            question,
            answers,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Answer text stored in the given slot.
    #[must_use]
    pub fn answer(&self, slot: SlotTag) -> &str {
        &self.answers[slot.index()]
    }

    #[must_use]
    pub fn correct_slot(&self) -> SlotTag {
        SlotTag::CORRECT
    }

    /// The three answers as options, in source order.
    #[must_use]
    pub fn options_in_source_order(&self) -> [AnswerOption; 3] {
        SlotTag::ALL.map(|slot| AnswerOption::new(self.answer(slot), slot))
    }
}

//
// ─── ANSWER OPTION ────────────────────────────────────────────────────────────
//

/// One displayable answer with a back-reference to its original slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub slot: SlotTag,
}

impl AnswerOption {
    #[must_use]
    pub fn new(text: impl Into<String>, slot: SlotTag) -> Self {
        Self {
            text: text.into(),
            slot,
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.slot.is_correct()
    }
}

//
// ─── RANDOMIZED QUESTION ──────────────────────────────────────────────────────
//

/// A question paired with the option order fixed for one session.
///
/// The option order never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomizedQuestion {
    record: QuestionRecord,
    options: [AnswerOption; 3],
}

impl RandomizedQuestion {
    /// Attach an option order to a record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NotAPermutation` unless `options` holds each of
    /// the record's (text, slot) pairs exactly once.
    pub fn from_options(
        record: QuestionRecord,
        options: [AnswerOption; 3],
    ) -> Result<Self, QuestionError> {
        let mut seen = [false; 3];
        for option in &options {
            let idx = option.slot.index();
            if seen[idx] || option.text != record.answer(option.slot) {
                return Err(QuestionError::NotAPermutation);
            }
            seen[idx] = true;
        }

        Ok(Self { record, options })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        self.record.id()
    }

    #[must_use]
    pub fn record(&self) -> &QuestionRecord {
        &self.record
    }

    #[must_use]
    pub fn question(&self) -> &str {
        self.record.question()
    }

    /// Options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_slot(&self) -> SlotTag {
        self.record.correct_slot()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
