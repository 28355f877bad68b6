//! Quiz content loading. Sources only hand over raw documents; validation and the
//! conversion into immutable rounds happen once in [`load`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::{dao::models::QuizDocument, state::game::QuizContent};

/// Result alias for content loading.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised while loading quiz content. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content file could not be read.
    #[error("failed to read content from {}", path.display())]
    Io {
        /// Location that was being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON or does not match the expected layout.
    #[error("malformed content document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The document parsed but violates a content rule (no rounds, empty round, bad time limit).
    #[error("invalid content: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Anything able to produce a raw quiz document.
pub trait ContentSource {
    /// Read and parse the document without validating it.
    fn fetch(&self) -> ContentResult<QuizDocument>;
}

/// Content stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Point the source at `path`; nothing is read until [`load`] runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for JsonFileSource {
    fn fetch(&self) -> ContentResult<QuizDocument> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ContentError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Content already held in memory as JSON text.
#[derive(Debug, Clone)]
pub struct JsonStrSource<'a>(pub &'a str);

impl ContentSource for JsonStrSource<'_> {
    fn fetch(&self) -> ContentResult<QuizDocument> {
        Ok(serde_json::from_str(self.0)?)
    }
}

/// Fetch, validate and freeze the rounds exposed by `source`.
pub fn load(source: &dyn ContentSource) -> ContentResult<QuizContent> {
    let document = source.fetch()?;
    document.validate()?;

    let content = QuizContent::from(document);
    info!(
        rounds = content.rounds().len(),
        questions = content.question_count(),
        "quiz content loaded"
    );
    Ok(content)
}
