// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Error taxonomy for gallery operations.
//!
//! The variant decides how a batch reacts: `Validation` and `Collaborator`
//! skip the offending file, `Schema` aborts the run before anything is written.

use std::path::Path;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Malformed or empty derived id / category, or an unsupported input file.
  #[error("Validation error: {0}")]
  Validation(String),

  /// Catalog document is unreadable or structurally invalid.
  #[error("Schema error: {0}")]
  Schema(String),

  /// ExifTool, ffprobe, or a file operation failed.
  #[error("Collaborator error: {0}")]
  Collaborator(String),
}

impl Error {
  /// Prefixes the message with the file it originated from, keeping the kind.
  #[must_use]
  pub fn in_file(self, file: impl AsRef<Path>) -> Self {
    let prefix = |message: String| format!("{}: {message}", file.as_ref().display());

    match self {
      Error::Validation(m) => Error::Validation(prefix(m)),
      Error::Schema(m) => Error::Schema(prefix(m)),
      Error::Collaborator(m) => Error::Collaborator(prefix(m)),
    }
  }
}
