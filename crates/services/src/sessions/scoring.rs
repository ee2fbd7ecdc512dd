use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    QuestionId, QuestionVerdict, RandomizedQuestion, ScoreReport, ScoreReportError, SelectedAnswer,
    SlotTag,
};

/// Score an attempt from its questions and final selections.
///
/// Verdicts follow question order. Selections naming questions outside the
/// list are ignored.
///
/// # Errors
///
/// Returns `ScoreReportError::InvalidTimeRange` if `submitted_at` precedes `started_at`.
pub fn score(
    questions: &[RandomizedQuestion],
    answers: &[SelectedAnswer],
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
) -> Result<ScoreReport, ScoreReportError> {
    let chosen: HashMap<&QuestionId, SlotTag> = answers
        .iter()
        .map(|answer| (&answer.question_id, answer.slot))
        .collect();

    let verdicts = questions
        .iter()
        .map(|question| {
            QuestionVerdict::judge(
                question.id().clone(),
                chosen.get(question.id()).copied(),
                question.correct_slot(),
            )
        })
        .collect();

    ScoreReport::from_verdicts(verdicts, started_at, submitted_at)
}
