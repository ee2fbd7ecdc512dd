use std::sync::Arc;

use rand::Rng;

use quiz_core::model::{QuestionRecord, QuizSettings, ScoreReport, SessionSize};
use storage::repository::{QuestionSource, SourceError};

use super::tracker::QuizSession;
use super::view::{QuizView, ReviewView};
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates fetching, randomizing, and submitting quiz sessions.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    settings: QuizSettings,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn QuestionSource>) -> Self {
        Self {
            clock,
            source,
            settings: QuizSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// A new session in `Loading`, for callers that render the spinner
    /// before calling [`QuizService::load`].
    #[must_use]
    pub fn begin(&self) -> QuizSession {
        QuizSession::loading(self.clock.now())
    }

    /// Fetch questions for a loading session and randomize them.
    ///
    /// A source failure is not returned; it leaves the session empty with
    /// [`QuizSession::load_failure`] set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyLoaded` if the session is past `Loading`.
    pub async fn load(&self, session: &mut QuizSession, size: SessionSize) -> Result<(), SessionError> {
        if !session.is_loading() {
            return Err(SessionError::AlreadyLoaded);
        }
        let fetched = self.fetch(size).await;
        let mut rng = rand::rng();
        session.resolve(fetched, &mut rng, self.clock.now())
    }

    /// Start a session of the configured size.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Question` if a fetched record cannot be randomized.
    pub async fn start_session(&self) -> Result<QuizSession, SessionError> {
        self.start_session_with_size(self.settings.session_size()).await
    }

    /// Start a session requesting `size` questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Question` if a fetched record cannot be randomized.
    pub async fn start_session_with_size(&self, size: SessionSize) -> Result<QuizSession, SessionError> {
        let mut session = self.begin();
        self.load(&mut session, size).await?;
        Ok(session)
    }

    /// Start a session with a caller-supplied RNG, for reproducible option order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Question` if a fetched record cannot be randomized.
    pub async fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        size: SessionSize,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let mut session = self.begin();
        let fetched = self.fetch(size).await;
        session.resolve(fetched, rng, self.clock.now())?;
        Ok(session)
    }

    /// Submit using the service clock.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::submit`].
    pub fn submit<'s>(&self, session: &'s mut QuizSession) -> Result<&'s ScoreReport, SessionError> {
        session.submit(self.clock.now())
    }

    #[must_use]
    pub fn quiz_view(&self, session: &QuizSession) -> QuizView {
        QuizView::from_session(session)
    }

    /// Results screen colored with the configured pass threshold.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` before submission.
    pub fn review(&self, session: &QuizSession) -> Result<ReviewView, SessionError> {
        ReviewView::from_session(session, self.settings.pass_threshold())
    }

    async fn fetch(&self, size: SessionSize) -> Result<Vec<QuestionRecord>, SourceError> {
        tracing::debug!(requested = size.get(), "fetching questions");
        let fetched = self.source.fetch(size).await;
        match &fetched {
            Ok(records) if records.len() < usize::try_from(size.get()).unwrap_or(usize::MAX) => {
                tracing::info!(
                    requested = size.get(),
                    returned = records.len(),
                    "question source returned a short pool"
                );
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "question fetch failed"),
        }
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::model::{QuestionId, SessionPhase, SlotTag};
    use quiz_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryQuestionSource;

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        async fn fetch(&self, _count: SessionSize) -> Result<Vec<QuestionRecord>, SourceError> {
            Err(SourceError::Unavailable("connection refused".into()))
        }
    }

    fn source(n: u32) -> Arc<dyn QuestionSource> {
        let records = (1..=n)
            .map(|i| {
                QuestionRecord::new(
                    QuestionId::new(i.to_string()),
                    format!("Question {i}"),
                    ["right".into(), "wrong".into(), "worse".into()],
                )
                .unwrap()
            })
            .collect();
        Arc::new(InMemoryQuestionSource::with_questions(records))
    }

    #[tokio::test]
    async fn short_pool_sets_effective_size() {
        let service = QuizService::new(fixed_clock(), source(3));
        let session = service.start_session().await.unwrap();
        assert_eq!(session.effective_size(), 3);
        assert_eq!(session.phase(), SessionPhase::InProgress);
    }

    #[tokio::test]
    async fn configured_size_limits_request() {
        let settings = QuizSettings::default().with_session_size(SessionSize::new(2).unwrap());
        let service = QuizService::new(fixed_clock(), source(10)).with_settings(settings);
        let session = service.start_session().await.unwrap();
        assert_eq!(session.effective_size(), 2);
    }

    #[tokio::test]
    async fn failing_source_gives_empty_session() {
        let service = QuizService::new(fixed_clock(), Arc::new(FailingSource));
        let session = service.start_session().await.unwrap();
        assert!(session.is_empty());
        assert!(session.load_failure().is_some());
        assert!(service.quiz_view(&session).load_failure.is_some());
    }

    #[tokio::test]
    async fn load_rejects_second_call() {
        let service = QuizService::new(fixed_clock(), source(1));
        let mut session = service.begin();
        assert!(session.is_loading());
        service.load(&mut session, SessionSize::DEFAULT).await.unwrap();
        let again = service.load(&mut session, SessionSize::DEFAULT).await;
        assert!(matches!(again, Err(SessionError::AlreadyLoaded)));
    }

    #[tokio::test]
    async fn seeded_rng_reproduces_option_order() {
        let service = QuizService::new(fixed_clock(), source(5));
        let a = service
            .start_session_with_rng(SessionSize::DEFAULT, &mut StdRng::seed_from_u64(11))
            .await
            .unwrap();
        let b = service
            .start_session_with_rng(SessionSize::DEFAULT, &mut StdRng::seed_from_u64(11))
            .await
            .unwrap();
        for (qa, qb) in a.questions().iter().zip(b.questions()) {
            assert_eq!(qa.options(), qb.options());
        }
    }

    #[tokio::test]
    async fn review_uses_configured_threshold() {
        let settings = QuizSettings::default().with_pass_threshold(1);
        let service = QuizService::new(fixed_clock(), source(1)).with_settings(settings);
        let mut session = service.start_session().await.unwrap();
        session.select(&QuestionId::new("1"), SlotTag::Answer1).unwrap();
        service.submit(&mut session).unwrap();

        let review = service.review(&session).unwrap();
        assert_eq!(review.band, crate::sessions::ScoreBand::Pass);
    }
}
