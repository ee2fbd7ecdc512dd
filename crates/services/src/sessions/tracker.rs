use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;

use quiz_core::model::{
    QuestionId, QuestionRecord, RandomizedQuestion, ScoreReport, SelectedAnswer, SessionId,
    SessionPhase, SlotTag,
};
use storage::repository::SourceError;

use super::progress::SessionProgress;
use super::randomizer::randomize_all;
use super::scoring::score;
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt: the randomized questions, the current selections, and
/// the submitted flag.
///
/// Questions are fixed when loading finishes and their option order never
/// changes afterwards. Each question holds at most one selection. Once
/// submitted, the session is read-only.
///
/// Not synchronized; wrap it in a mutex to share it across threads.
pub struct QuizSession {
    id: SessionId,
    phase: SessionPhase,
    questions: Vec<RandomizedQuestion>,
    index: HashMap<QuestionId, usize>,
    selections: Vec<Option<SlotTag>>,
    answered: usize,
    load_failure: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    report: Option<ScoreReport>,
}

impl QuizSession {
    /// Create a session waiting for its questions.
    #[must_use]
    pub fn loading(created_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            index: HashMap::new(),
            selections: Vec::new(),
            answered: 0,
            load_failure: None,
            created_at,
            started_at: None,
            report: None,
        }
    }

    /// Create a session directly from already randomized questions.
    ///
    /// Questions whose id repeats an earlier one are dropped.
    #[must_use]
    pub fn with_questions(questions: Vec<RandomizedQuestion>, started_at: DateTime<Utc>) -> Self {
        let mut session = Self::loading(started_at);
        session.install(questions, started_at);
        session
    }

    /// Finish loading with the source's result.
    ///
    /// A failed fetch leaves an empty session that records the failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyLoaded` if the session left `Loading` before.
    /// Returns `SessionError::Question` if a record cannot be randomized.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        fetched: Result<Vec<QuestionRecord>, SourceError>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Loading {
            return Err(SessionError::AlreadyLoaded);
        }

        match fetched {
            Ok(records) => {
                let questions = randomize_all(records, rng)?;
                self.install(questions, now);
            }
            Err(err) => {
                tracing::warn!(session = %self.id, error = %err, "question source failed; presenting empty session");
                self.load_failure = Some(err.to_string());
                self.install(Vec::new(), now);
            }
        }
        Ok(())
    }

    fn install(&mut self, questions: Vec<RandomizedQuestion>, started_at: DateTime<Utc>) {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(questions.len());
        for question in questions {
            if seen.insert(question.id().clone()) {
                unique.push(question);
            } else {
                tracing::warn!(session = %self.id, question = %question.id(), "dropping duplicate question");
            }
        }

        self.index = unique
            .iter()
            .enumerate()
            .map(|(pos, q)| (q.id().clone(), pos))
            .collect();
        self.selections = vec![None; unique.len()];
        self.answered = 0;
        self.questions = unique;
        self.started_at = Some(started_at);
        self.phase = SessionPhase::InProgress;
        tracing::debug!(session = %self.id, questions = self.questions.len(), "session loaded");
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    /// Why loading produced an empty session, if the source failed.
    #[must_use]
    pub fn load_failure(&self) -> Option<&str> {
        self.load_failure.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Questions in session order.
    #[must_use]
    pub fn questions(&self) -> &[RandomizedQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&RandomizedQuestion> {
        self.index.get(id).map(|&pos| &self.questions[pos])
    }

    /// Number of questions the source actually returned.
    #[must_use]
    pub fn effective_size(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Current choice for a question.
    #[must_use]
    pub fn selection(&self, id: &QuestionId) -> Option<SlotTag> {
        self.index.get(id).and_then(|&pos| self.selections[pos])
    }

    /// Recorded selections in session order.
    #[must_use]
    pub fn selected_answers(&self) -> Vec<SelectedAnswer> {
        self.questions
            .iter()
            .zip(&self.selections)
            .filter_map(|(q, slot)| slot.map(|slot| SelectedAnswer::new(q.id().clone(), slot)))
            .collect()
    }

    /// Number of distinct questions with a selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered
    }

    /// True once every returned question has a selection.
    ///
    /// An empty loaded session is complete. A loading session never is.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.is_loading() && self.answered == self.questions.len()
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.is_complete()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answered,
            remaining: self.questions.len() - self.answered,
            is_complete: self.is_complete(),
        }
    }

    /// True while leaving would lose an unsubmitted, non-empty attempt.
    #[must_use]
    pub fn needs_exit_confirmation(&self) -> bool {
        self.phase == SessionPhase::InProgress && !self.questions.is_empty()
    }

    /// Record the user's choice for a question, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` while loading, `SessionError::Submitted`
    /// after submission, and `SessionError::UnknownQuestion` for ids outside the
    /// session. State is untouched in every error case.
    pub fn select(&mut self, id: &QuestionId, slot: SlotTag) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Loading => return Err(SessionError::NotLoaded),
            SessionPhase::Submitted => {
                tracing::debug!(session = %self.id, question = %id, "ignoring selection after submit");
                return Err(SessionError::Submitted);
            }
            SessionPhase::InProgress => {}
        }

        let Some(&pos) = self.index.get(id) else {
            tracing::warn!(session = %self.id, question = %id, "selection for unknown question");
            return Err(SessionError::UnknownQuestion(id.clone()));
        };

        if self.selections[pos].replace(slot).is_none() {
            self.answered += 1;
        }
        Ok(())
    }

    /// Submit the attempt and freeze it.
    ///
    /// Submitting an already submitted session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` while loading and
    /// `SessionError::Incomplete` if any question lacks a selection.
    pub fn submit(&mut self, submitted_at: DateTime<Utc>) -> Result<&ScoreReport, SessionError> {
        match self.phase {
            SessionPhase::Loading => return Err(SessionError::NotLoaded),
            SessionPhase::Submitted => return self.score(),
            SessionPhase::InProgress => {}
        }

        if !self.is_complete() {
            tracing::debug!(
                session = %self.id,
                answered = self.answered,
                total = self.questions.len(),
                "refusing incomplete submission"
            );
            return Err(SessionError::Incomplete {
                answered: self.answered,
                total: self.questions.len(),
            });
        }

        let started_at = self.started_at.unwrap_or(self.created_at);
        let report = score(
            &self.questions,
            &self.selected_answers(),
            started_at,
            submitted_at.max(started_at),
        )?;
        tracing::info!(
            session = %self.id,
            correct = report.correct_count(),
            total = report.total(),
            "session submitted"
        );

        self.phase = SessionPhase::Submitted;
        Ok(self.report.insert(report))
    }

    /// The scored outcome; only available after submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` before submission.
    pub fn score(&self) -> Result<&ScoreReport, SessionError> {
        self.report.as_ref().ok_or(SessionError::NotSubmitted)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("answered", &self.answered)
            .field("load_failure", &self.load_failure)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
