use async_trait::async_trait;
use quiz_core::model::{QuestionId, QuestionRecord, SessionSize};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The store could not be reached or refused the request.
    #[error("question source unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SourceError {
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }
}

/// Identifier as it appears on the wire; hosted stores use UUID strings,
/// local tables use integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuestionId {
    Text(String),
    Number(i64),
}

impl RawQuestionId {
    fn into_question_id(self) -> QuestionId {
        match self {
            RawQuestionId::Text(s) => QuestionId::new(s),
            RawQuestionId::Number(n) => QuestionId::new(n.to_string()),
        }
    }
}

/// Flat shape of a question row, shared by the SQL table and the RPC payload.
///
/// `answer1` is always the correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: RawQuestionId,
    pub question: String,
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
}

impl QuestionRow {
    #[must_use]
    pub fn from_record(record: &QuestionRecord) -> Self {
        use quiz_core::model::SlotTag;
        Self {
            id: RawQuestionId::Text(record.id().as_str().to_owned()),
            question: record.question().to_owned(),
            answer1: record.answer(SlotTag::Answer1).to_owned(),
            answer2: record.answer(SlotTag::Answer2).to_owned(),
            answer3: record.answer(SlotTag::Answer3).to_owned(),
        }
    }

    /// Convert the row into a validated domain record.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Serialization` if the row fails record validation.
    pub fn into_record(self) -> Result<QuestionRecord, SourceError> {
        QuestionRecord::new(
            self.id.into_question_id(),
            self.question,
            [self.answer1, self.answer2, self.answer3],
        )
        .map_err(|e| SourceError::Serialization(e.to_string()))
    }
}

/// Convert fetched rows, dropping any that fail record validation.
///
/// Each skipped row is logged at `warn`; the valid rows keep their order.
pub fn records_from_rows<I>(rows: I) -> Vec<QuestionRecord>
where
    I: IntoIterator<Item = QuestionRow>,
{
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match row.into_record() {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(question = ?id, error = %err, "skipping invalid question row");
                    None
                }
            }
        })
        .collect()
}

/// Read side of the question store: the only thing a quiz session needs.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch up to `count` questions in the store's order.
    ///
    /// Returning fewer than `count` is not an error.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the store cannot be read.
    async fn fetch(&self, count: SessionSize) -> Result<Vec<QuestionRecord>, SourceError>;
}

/// Write side used for seeding and tests.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Insert or replace a question by id.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the question cannot be stored.
    async fn upsert_question(&self, record: &QuestionRecord) -> Result<(), SourceError>;

    /// Number of stored questions.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the store cannot be read.
    async fn count_questions(&self) -> Result<u64, SourceError>;
}

/// In-memory question store for tests and offline use.
///
/// `fetch` returns questions in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryQuestionSource {
    questions: Arc<Mutex<Vec<QuestionRecord>>>,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
        }
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn fetch(&self, count: SessionSize) -> Result<Vec<QuestionRecord>, SourceError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        let take = usize::try_from(count.get()).unwrap_or(usize::MAX);
        Ok(guard.iter().take(take).cloned().collect())
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionSource {
    async fn upsert_question(&self, record: &QuestionRecord) -> Result<(), SourceError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        match guard.iter_mut().find(|q| q.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => guard.push(record.clone()),
        }
        Ok(())
    }

    async fn count_questions(&self) -> Result<u64, SourceError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(guard.len() as u64)
    }
}

/// Aggregates the read and write sides behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub bank: Arc<dyn QuestionBank>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryQuestionSource::new();
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let bank: Arc<dyn QuestionBank> = Arc::new(repo);
        Self { questions, bank }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_record(id: &str) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(id),
            format!("Question {id}"),
            ["right".into(), "wrong".into(), "also wrong".into()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_at_most_count_in_order() {
        let repo = InMemoryQuestionSource::with_questions(vec![
            build_record("1"),
            build_record("2"),
            build_record("3"),
        ]);

        let fetched = repo.fetch(SessionSize::new(2).unwrap()).await.unwrap();
        let ids: Vec<_> = fetched.iter().map(|q| q.id().as_str().to_owned()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn fetch_returns_short_pool_without_error() {
        let repo = InMemoryQuestionSource::with_questions(vec![build_record("1")]);
        let fetched = repo.fetch(SessionSize::DEFAULT).await.unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let repo = InMemoryQuestionSource::new();
        repo.upsert_question(&build_record("1")).await.unwrap();
        let replacement = QuestionRecord::new(
            QuestionId::new("1"),
            "Rewritten",
            ["a".into(), "b".into(), "c".into()],
        )
        .unwrap();
        repo.upsert_question(&replacement).await.unwrap();

        assert_eq!(repo.count_questions().await.unwrap(), 1);
        let fetched = repo.fetch(SessionSize::DEFAULT).await.unwrap();
        assert_eq!(fetched[0].question(), "Rewritten");
    }

    #[test]
    fn row_accepts_string_and_numeric_ids() {
        let text: QuestionRow = serde_json::from_str(
            r#"{"id":"a1b2","question":"Q","answer1":"x","answer2":"y","answer3":"z"}"#,
        )
        .unwrap();
        assert_eq!(text.into_record().unwrap().id().as_str(), "a1b2");

        let number: QuestionRow = serde_json::from_str(
            r#"{"id":17,"question":"Q","answer1":"x","answer2":"y","answer3":"z"}"#,
        )
        .unwrap();
        assert_eq!(number.into_record().unwrap().id().as_str(), "17");
    }

    fn row(id: &str, answer2: &str) -> QuestionRow {
        QuestionRow {
            id: RawQuestionId::Text(id.into()),
            question: format!("Question {id}"),
            answer1: "right".into(),
            answer2: answer2.into(),
            answer3: "worse".into(),
        }
    }

    #[test]
    fn invalid_rows_are_skipped_and_rest_kept_in_order() {
        let records = records_from_rows(vec![row("1", "wrong"), row("2", ""), row("3", "wrong")]);
        let ids: Vec<_> = records.iter().map(|q| q.id().as_str().to_owned()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn in_memory_storage_shares_bank_and_source() {
        let storage = Storage::in_memory();
        storage.bank.upsert_question(&build_record("1")).await.unwrap();
        storage.bank.upsert_question(&build_record("2")).await.unwrap();

        assert_eq!(storage.bank.count_questions().await.unwrap(), 2);
        let fetched = storage.questions.fetch(SessionSize::DEFAULT).await.unwrap();
        assert_eq!(fetched.len(), 2);
    }

    #[test]
    fn invalid_row_maps_to_serialization_error() {
        let row = QuestionRow {
            id: RawQuestionId::Text("1".into()),
            question: "Q".into(),
            answer1: String::new(),
            answer2: "b".into(),
            answer3: "c".into(),
        };
        assert!(matches!(
            row.into_record().unwrap_err(),
            SourceError::Serialization(_)
        ));
    }
}
