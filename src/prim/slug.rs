// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Deterministic identifiers and display labels derived from file names and
//! tags.

use std::{path::Path, sync::LazyLock};

use regex::Regex;

/// Runs of anything that may not appear in a slug. Applied after ASCII
/// lowercasing, so casing never depends on locale.
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Identifier and display title derived from a single source file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
  pub id:    String,
  pub title: String,
}

/// Derives an item `id` and `title` from `file_name`.
///
/// Only the final path component is considered, with its extension removed.
/// The id is a slug (see `slugify`); the title keeps the stem as written,
/// trimmed of surrounding whitespace.
pub fn sanitize(file_name: impl AsRef<Path>) -> Sanitized {
  let stem = file_name
    .as_ref()
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();

  Sanitized {
    id:    slugify(&stem),
    title: stem.trim().to_string(),
  }
}

/// Lowercases `text` (ASCII only), collapses every run of non-alphanumeric
/// characters into a single `_`, and strips `_` from both ends.
/// Non-ASCII characters are treated as separators.
pub fn slugify(text: &str) -> String {
  let lower = text.to_ascii_lowercase();
  NON_SLUG
    .replace_all(&lower, "_")
    .trim_matches('_')
    .to_string()
}

/// Turns a tag into a display name: words split on the same separators as
/// `slugify`, each capitalized, joined with spaces (`night-sky` -> `Night Sky`).
pub fn title_case(text: &str) -> String {
  slugify(text)
    .split('_')
    .filter(|w| !w.is_empty())
    .map(|w| {
      let mut chars = w.chars();
      chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
      })
    })
    .collect::<Vec<_>>()
    .join(" ")
}
