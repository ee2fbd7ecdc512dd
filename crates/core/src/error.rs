use thiserror::Error;

use crate::model::{QuestionError, ScoreReportError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    ScoreReport(#[from] ScoreReportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, QuestionRecord, QuizSettingsDraft};

    fn build(size: &str, answer: &str) -> Result<(), Error> {
        QuizSettingsDraft {
            session_size: Some(size.into()),
            ..QuizSettingsDraft::default()
        }
        .validate()?;
        QuestionRecord::new(
            QuestionId::new("1"),
            "Question",
            ["right".into(), answer.into(), "worse".into()],
        )?;
        Ok(())
    }

    #[test]
    fn layer_errors_convert_with_question_mark() {
        assert!(build("10", "wrong").is_ok());
        assert!(matches!(build("0", "wrong"), Err(Error::Settings(_))));
        assert!(matches!(build("10", " "), Err(Error::Question(_))));
    }
}
