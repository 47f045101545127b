use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot resolve ownership: {0}")]
    Resolution(String),
    #[error("forge error: {0}")]
    Forge(String),
    #[error("file cache error: {0}")]
    FileCache(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Effects(EffectFailures),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// A forge-mutating action whose failure does not stop its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AttachLabel { label: String },
    PostComment,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::AttachLabel { label } => write!(f, "attach label {label}"),
            Effect::PostComment => f.write_str("post comment"),
        }
    }
}

#[derive(Debug)]
pub struct EffectFailure {
    pub effect: Effect,
    pub error: AppError,
}

/// Ordered collection of independent effect failures.
#[derive(Debug, Default)]
pub struct EffectFailures(Vec<EffectFailure>);

impl EffectFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect, error: AppError) {
        self.0.push(EffectFailure { effect, error });
    }

    /// Records the error of `result`, if any, against `effect`.
    pub fn collect(&mut self, effect: Effect, result: AppResult<()>) {
        if let Err(error) = result {
            self.push(effect, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectFailure> {
        self.0.iter()
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Effects(self))
        }
    }
}

impl fmt::Display for EffectFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} effect(s) failed", self.0.len())?;
        for (index, failure) in self.0.iter().enumerate() {
            let sep = if index == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", failure.effect, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for EffectFailures {}
