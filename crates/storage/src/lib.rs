#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryQuestionSource, QuestionBank, QuestionRow, QuestionSource, SourceError, Storage,
    records_from_rows,
};
