#![forbid(unsafe_code)]

pub mod error;
pub mod remote_source;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{RemoteSourceError, SessionError};
pub use remote_source::{RemoteQuestionSource, RemoteSourceConfig};

pub use sessions::{
    ExitDecision, ExitGuard, QuizService, QuizSession, QuizView, ReviewView, ScoreBand,
    SessionProgress, UnloadHost,
};
