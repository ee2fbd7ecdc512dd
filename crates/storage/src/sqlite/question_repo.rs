use quiz_core::model::{QuestionRecord, SessionSize, SlotTag};

use super::{SqliteRepository, mapping::map_question_row};
use crate::repository::{QuestionBank, QuestionSource, SourceError, records_from_rows};

fn unavailable(e: sqlx::Error) -> SourceError {
    SourceError::Unavailable(e.to_string())
}

#[async_trait::async_trait]
impl QuestionSource for SqliteRepository {
    async fn fetch(&self, count: SessionSize) -> Result<Vec<QuestionRecord>, SourceError> {
        let rows = sqlx::query(
            r"
            SELECT id, question, answer1, answer2, answer3
            FROM questions
            ORDER BY RANDOM()
            LIMIT ?1
            ",
        )
        .bind(i64::from(count.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let raw = rows
            .iter()
            .map(map_question_row)
            .collect::<Result<Vec<_>, _>>()?;
        let questions = records_from_rows(raw);
        tracing::debug!(
            requested = count.get(),
            returned = questions.len(),
            "fetched questions from sqlite"
        );
        Ok(questions)
    }
}

#[async_trait::async_trait]
impl QuestionBank for SqliteRepository {
    async fn upsert_question(&self, record: &QuestionRecord) -> Result<(), SourceError> {
        sqlx::query(
            r"
            INSERT INTO questions (id, question, answer1, answer2, answer3)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                question = excluded.question,
                answer1 = excluded.answer1,
                answer2 = excluded.answer2,
                answer3 = excluded.answer3
            ",
        )
        .bind(record.id().as_str())
        .bind(record.question())
        .bind(record.answer(SlotTag::Answer1))
        .bind(record.answer(SlotTag::Answer2))
        .bind(record.answer(SlotTag::Answer3))
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn count_questions(&self) -> Result<u64, SourceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        u64::try_from(count).map_err(|_| SourceError::Serialization("negative count".into()))
    }
}
