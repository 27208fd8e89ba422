//! Per-panel load state with request sequencing.
//!
//! Every fetch takes a fresh [`RequestToken`] from its panel; a response is only
//! applied when it carries the panel's latest token, so a slow old response can
//! never overwrite a newer one.
//!
use crate::error::ApiError;

/// Monotonic generation number attached to a fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Panel<T> {
    state: LoadState<T>,
    generation: u64,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            state: LoadState::NotLoaded,
            generation: 0,
        }
    }
}

impl<T> Panel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty panel whose first token comes after `last`, for views that are
    /// rebuilt while replies for an earlier instance may still arrive.
    pub fn resume_after(last: RequestToken) -> Self {
        Self {
            state: LoadState::NotLoaded,
            generation: last.0,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    /// True when the panel has nothing usable to show.
    pub fn needs_load(&self) -> bool {
        matches!(self.state, LoadState::NotLoaded | LoadState::Failed(_))
    }

    /// Start a new request: the panel shows its loading placeholder and any
    /// response for an earlier token becomes stale.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        self.state = LoadState::Loading;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Apply a response. Returns `false` (and leaves the panel untouched) when
    /// the token is stale.
    pub fn resolve(&mut self, token: RequestToken, result: Result<T, ApiError>) -> bool {
        if !self.is_current(token) {
            tracing::debug!(
                token = token.0,
                current = self.generation,
                "discarding stale response"
            );
            return false;
        }
        self.state = match result {
            Ok(data) => LoadState::Loaded(data),
            Err(err) => LoadState::Failed(err.to_string()),
        };
        true
    }
}
