mod ids;
mod question;
mod session;
mod settings;

pub use ids::{ParseIdError, QuestionId, SessionId};
pub use question::{AnswerOption, QuestionError, QuestionRecord, RandomizedQuestion, SlotTag};
pub use session::{
    QuestionVerdict, ScoreReport, ScoreReportError, SelectedAnswer, SessionPhase, Verdict,
};
pub use settings::{
    DEFAULT_PASS_THRESHOLD, QuizSettings, QuizSettingsDraft, SessionSize, SettingsError,
};
