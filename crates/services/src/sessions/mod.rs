mod exit_guard;
mod progress;
mod randomizer;
mod scoring;
mod tracker;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use exit_guard::{ExitDecision, ExitGuard, UnloadHost};
pub use progress::SessionProgress;
pub use randomizer::{randomize, randomize_all};
pub use scoring::score;
pub use tracker::QuizSession;
pub use view::{
    Highlight, OptionView, QuestionView, QuizView, ReviewOptionView, ReviewQuestionView,
    ReviewView, ScoreBand,
};
pub use workflow::QuizService;
