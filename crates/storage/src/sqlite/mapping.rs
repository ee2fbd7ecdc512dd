use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuestionRow, RawQuestionId, SourceError};

fn ser<E: core::fmt::Display>(e: E) -> SourceError {
    SourceError::Serialization(e.to_string())
}

/// Read the columns of a `questions` row; record validation happens later.
pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuestionRow, SourceError> {
    Ok(QuestionRow {
        id: RawQuestionId::Text(row.try_get::<String, _>("id").map_err(ser)?),
        question: row.try_get("question").map_err(ser)?,
        answer1: row.try_get("answer1").map_err(ser)?,
        answer2: row.try_get("answer2").map_err(ser)?,
        answer3: row.try_get("answer3").map_err(ser)?,
    })
}
