use chrono::Duration;
use serde::Serialize;

use quiz_core::model::{QuestionId, SessionPhase, SlotTag, Verdict};

use super::progress::SessionProgress;
use super::tracker::QuizSession;
use crate::error::SessionError;

//
// ─── ANSWERING ────────────────────────────────────────────────────────────────
//

/// Snapshot of a session for the answering screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub phase: SessionPhase,
    pub questions: Vec<QuestionView>,
    pub progress: SessionProgress,
    pub can_submit: bool,
    pub load_failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// 1-based position in the session.
    pub number: usize,
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub text: String,
    pub slot: SlotTag,
    pub checked: bool,
}

impl QuizView {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let questions = session
            .questions()
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let selected = session.selection(question.id());
                QuestionView {
                    number: idx + 1,
                    id: question.id().clone(),
                    text: question.question().to_owned(),
                    options: question
                        .options()
                        .iter()
                        .map(|option| OptionView {
                            text: option.text.clone(),
                            slot: option.slot,
                            checked: selected == Some(option.slot),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            phase: session.phase(),
            questions,
            progress: session.progress(),
            can_submit: session.can_submit(),
            load_failure: session.load_failure().map(ToOwned::to_owned),
        }
    }
}

//
// ─── REVIEW ───────────────────────────────────────────────────────────────────
//

/// Headline coloring for the correct count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Pass,
    Fail,
}

impl ScoreBand {
    #[must_use]
    pub fn for_count(correct: usize, pass_threshold: u32) -> Self {
        let threshold = usize::try_from(pass_threshold).unwrap_or(usize::MAX);
        if correct >= threshold {
            ScoreBand::Pass
        } else {
            ScoreBand::Fail
        }
    }
}

/// How an option is drawn on the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Correct,
    WrongChoice,
    Neutral,
}

/// Snapshot of a submitted session for the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub correct_count: usize,
    pub total: usize,
    pub band: ScoreBand,
    pub elapsed_seconds: i64,
    pub questions: Vec<ReviewQuestionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewQuestionView {
    pub number: usize,
    pub id: QuestionId,
    pub text: String,
    pub verdict: Verdict,
    pub options: Vec<ReviewOptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOptionView {
    pub text: String,
    pub slot: SlotTag,
    pub highlight: Highlight,
}

impl ReviewView {
    /// Build the results screen; options keep the order the user saw.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` before submission.
    pub fn from_session(session: &QuizSession, pass_threshold: u32) -> Result<Self, SessionError> {
        let report = session.score()?;

        let questions = session
            .questions()
            .iter()
            .zip(report.verdicts())
            .enumerate()
            .map(|(idx, (question, verdict))| ReviewQuestionView {
                number: idx + 1,
                id: question.id().clone(),
                text: question.question().to_owned(),
                verdict: verdict.verdict,
                options: question
                    .options()
                    .iter()
                    .map(|option| ReviewOptionView {
                        text: option.text.clone(),
                        slot: option.slot,
                        highlight: highlight(option.slot, verdict.correct, verdict.selected),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            correct_count: report.correct_count(),
            total: report.total(),
            band: ScoreBand::for_count(report.correct_count(), pass_threshold),
            elapsed_seconds: elapsed_seconds(report.elapsed()),
            questions,
        })
    }
}

fn highlight(slot: SlotTag, correct: SlotTag, selected: Option<SlotTag>) -> Highlight {
    if slot == correct {
        Highlight::Correct
    } else if selected == Some(slot) {
        Highlight::WrongChoice
    } else {
        Highlight::Neutral
    }
}

fn elapsed_seconds(elapsed: Duration) -> i64 {
    elapsed.num_seconds().max(0)
}
