use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{QuestionId, SlotTag};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreReportError {
    #[error("submitted_at is before started_at")]
    InvalidTimeRange,
}

/// The user's current choice for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAnswer {
    pub question_id: QuestionId,
    pub slot: SlotTag,
}

impl SelectedAnswer {
    #[must_use]
    pub fn new(question_id: QuestionId, slot: SlotTag) -> Self {
        Self { question_id, slot }
    }
}

/// Lifecycle of a quiz attempt.
///
/// `Loading` is left exactly once; `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    InProgress,
    Submitted,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Loading => "loading",
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Scoring outcome for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionVerdict {
    pub question_id: QuestionId,
    /// `None` only if the question was never answered.
    pub selected: Option<SlotTag>,
    pub correct: SlotTag,
    pub verdict: Verdict,
}

impl QuestionVerdict {
    #[must_use]
    pub fn judge(question_id: QuestionId, selected: Option<SlotTag>, correct: SlotTag) -> Self {
        let verdict = if selected == Some(correct) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        Self {
            question_id,
            selected,
            correct,
            verdict,
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

/// Raw result of a submitted attempt.
///
/// Holds only counts and verdicts; pass/fail policy lives with the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    correct_count: usize,
    verdicts: Vec<QuestionVerdict>,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
}

impl ScoreReport {
    /// Build a report from verdicts listed in session order.
    ///
    /// # Errors
    ///
    /// Returns `ScoreReportError::InvalidTimeRange` if `submitted_at` is before `started_at`.
    pub fn from_verdicts(
        verdicts: Vec<QuestionVerdict>,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, ScoreReportError> {
        if submitted_at < started_at {
            return Err(ScoreReportError::InvalidTimeRange);
        }
        let correct_count = verdicts.iter().filter(|v| v.is_correct()).count();

        Ok(Self {
            correct_count,
            verdicts,
            started_at,
            submitted_at,
        })
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total() - self.correct_count
    }

    #[must_use]
    pub fn verdicts(&self) -> &[QuestionVerdict] {
        &self.verdicts
    }

    #[must_use]
    pub fn verdict_for(&self, question_id: &QuestionId) -> Option<&QuestionVerdict> {
        self.verdicts.iter().find(|v| &v.question_id == question_id)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Time spent between the questions arriving and submission.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.submitted_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn verdict(id: &str, selected: SlotTag) -> QuestionVerdict {
        QuestionVerdict::judge(QuestionId::new(id), Some(selected), SlotTag::CORRECT)
    }

    #[test]
    fn judge_compares_against_correct_slot() {
        assert_eq!(verdict("1", SlotTag::Answer1).verdict, Verdict::Correct);
        assert_eq!(verdict("2", SlotTag::Answer3).verdict, Verdict::Incorrect);
    }

    #[test]
    fn unanswered_question_is_incorrect() {
        let v = QuestionVerdict::judge(QuestionId::new("1"), None, SlotTag::CORRECT);
        assert!(!v.is_correct());
    }

    #[test]
    fn report_counts_correct_verdicts() {
        let report = ScoreReport::from_verdicts(
            vec![
                verdict("1", SlotTag::Answer1),
                verdict("2", SlotTag::Answer2),
                verdict("3", SlotTag::Answer1),
            ],
            fixed_now(),
            fixed_now() + Duration::minutes(12),
        )
        .unwrap();

        assert_eq!(report.correct_count(), 2);
        assert_eq!(report.incorrect_count(), 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.elapsed(), Duration::minutes(12));
        assert!(report.verdict_for(&QuestionId::new("3")).unwrap().is_correct());
    }

    #[test]
    fn report_rejects_inverted_time_range() {
        let err = ScoreReport::from_verdicts(Vec::new(), fixed_now(), fixed_now() - Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err, ScoreReportError::InvalidTimeRange);
    }

    #[test]
    fn report_serializes_with_timestamps() {
        let report = ScoreReport::from_verdicts(
            vec![verdict("1", SlotTag::Answer1)],
            fixed_now(),
            fixed_now() + Duration::seconds(30),
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["correct_count"], 1);
        assert_eq!(json["started_at"], serde_json::json!(fixed_now()));
        assert_eq!(json["verdicts"][0]["verdict"], "correct");
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&SessionPhase::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
