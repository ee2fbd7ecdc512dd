use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid session size: {raw}")]
    InvalidSessionSize { raw: String },
    #[error("session size must be at least 1")]
    ZeroSessionSize,
    #[error("invalid source URL")]
    InvalidSourceUrl,
}

//
// ─── SESSION SIZE ─────────────────────────────────────────────────────────────
//

/// Number of questions requested from the source for one attempt.
///
/// The source may return fewer; the returned length is what gates submission.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionSize(NonZeroU32);

impl SessionSize {
    /// Requested count used when the caller supplies none.
    pub const DEFAULT: SessionSize = SessionSize(NonZeroU32::new(40).unwrap());

    /// # Errors
    ///
    /// Returns `SettingsError::ZeroSessionSize` for `0`.
    pub fn new(count: u32) -> Result<Self, SettingsError> {
        NonZeroU32::new(count)
            .map(Self)
            .ok_or(SettingsError::ZeroSessionSize)
    }

    /// Interpret the externally supplied size parameter (e.g. `?limit=20`).
    ///
    /// Absent or blank values fall back to [`SessionSize::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidSessionSize` for non-numeric input and
    /// `SettingsError::ZeroSessionSize` for `0`.
    pub fn parse(raw: Option<&str>) -> Result<Self, SettingsError> {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::DEFAULT);
        };
        let count = raw
            .parse::<u32>()
            .map_err(|_| SettingsError::InvalidSessionSize {
                raw: raw.to_string(),
            })?;
        Self::new(count)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for SessionSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for SessionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionSize({})", self.0)
    }
}

impl fmt::Display for SessionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── QUIZ SETTINGS ────────────────────────────────────────────────────────────
//

/// Correct answers needed for the headline score to show as a pass.
pub const DEFAULT_PASS_THRESHOLD: u32 = 36;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    session_size: SessionSize,
    pass_threshold: u32,
    source_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub session_size: Option<String>,
    pub pass_threshold: Option<u32>,
    pub source_base_url: Option<String>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the session size is malformed or the source URL is invalid.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let session_size = SessionSize::parse(self.session_size.as_deref())?;
        let source_base_url = normalize_optional(self.source_base_url);

        if let Some(url) = source_base_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(SettingsError::InvalidSourceUrl);
            }
        }

        Ok(QuizSettings {
            session_size,
            pass_threshold: self.pass_threshold.unwrap_or(DEFAULT_PASS_THRESHOLD),
            source_base_url,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn session_size(&self) -> SessionSize {
        self.session_size
    }

    #[must_use]
    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }

    #[must_use]
    pub fn source_base_url(&self) -> Option<&str> {
        self.source_base_url.as_deref()
    }

    #[must_use]
    pub fn with_session_size(mut self, size: SessionSize) -> Self {
        self.session_size = size;
        self
    }

    #[must_use]
    pub fn with_pass_threshold(mut self, threshold: u32) -> Self {
        self.pass_threshold = threshold;
        self
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            session_size: SessionSize::DEFAULT,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            source_base_url: None,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
