// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! A gallery root on disk: the manifest plus the asset directories it points
//! into.
//!
//! Operations are split by file: `import` brings new HEIC files in,
//! `maintenance` repairs an existing manifest.

mod import;
mod maintenance;

use std::path::{Path, PathBuf};

pub use import::ImportReport;

use crate::{
  error::{Error, Result},
  io::{self, Clock, MediaTools},
  prim::Catalog,
};

/// Manifest file name, relative to the gallery root.
pub const CONFIG_FILE: &str = "gallery-config.json";
/// Directory for copied images, relative to the gallery root.
pub const IMAGES_DIR: &str = "images";
/// Directory for extracted Live Photo videos, relative to the gallery root.
pub const VIDEOS_DIR: &str = "videos";
/// `baseURL` written into new manifests, where the app fetches assets from.
pub const DEFAULT_BASE_URL: &str =
  "https://raw.githubusercontent.com/CodingMogul/livephotos-gallery/master";

/// Manager for a single gallery root.
///
/// All changes happen on the in-memory `catalog`. Nothing is written to the
/// manifest until `save`.
pub struct Gallery<'a> {
  root:     PathBuf,
  catalog:  Catalog,
  tools:    &'a dyn MediaTools,
  clock:    &'a dyn Clock,
  modified: bool,
}

impl<'a> Gallery<'a> {
  /// Loads the manifest under `root`, or starts an empty one if there is none.
  pub fn load(
    root: impl AsRef<Path>,
    tools: &'a dyn MediaTools,
    clock: &'a dyn Clock,
  ) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    let config = root.join(CONFIG_FILE);

    let catalog = match io::read_if_exists(&config).map_err(Error::Schema)? {
      Some(json) => Catalog::from_json(json).map_err(|e| e.in_file(&config))?,
      None => {
        log::info!("{}: Not found, starting a new gallery.", config.display());
        Catalog::new(&io::timestamp(clock.now()), DEFAULT_BASE_URL)
      }
    };

    log::debug!(
      "{}: Loaded {} categories, {} items.",
      config.display(),
      catalog.categories.len(),
      catalog.iter_items().count()
    );

    Ok(Self {
      root,
      catalog,
      tools,
      clock,
      modified: false,
    })
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  /// Points the manifest's relative URLs at `base_url`.
  pub fn set_base_url(&mut self, base_url: &str) {
    if self.catalog.set_base_url(base_url) {
      log::info!("Setting baseURL to {base_url}.");
      self.modified = true;
    }
  }

  /// Whether there are changes not yet written by `save`.
  pub fn is_modified(&self) -> bool {
    self.modified
  }

  /// Stamps `lastUpdated` and atomically replaces the manifest on disk.
  pub fn save(&mut self) -> Result<()> {
    let config = self.root.join(CONFIG_FILE);

    if !self.is_modified() {
      log::info!("{}: No changes to save.", config.display());
      return Ok(());
    }

    self.catalog.touch(&io::timestamp(self.clock.now()));
    let json = self.catalog.to_json()?;
    io::write_atomic(&config, json).map_err(Error::Collaborator)?;

    log::info!("{}: Saved.", config.display());
    self.modified = false;

    Ok(())
  }
}

#[cfg(test)]
mod test_load {
  use super::*;
  use crate::{assert_err, testing::*};

  #[test]
  fn starts_empty_without_manifest() {
    let d = test_dir!();
    let (tools, clock) = (FakeTools::new(), FixedClock::at(2024, 5, 1, 12, 0, 0));

    let g = Gallery::load(d.root(), &tools, &clock).unwrap();

    assert_eq!(
      g.catalog(),
      &Catalog::new("2024-05-01T12:00:00.000000+00:00", DEFAULT_BASE_URL)
    );
    assert!(!g.is_modified());
  }

  #[test]
  fn reads_existing_manifest() {
    let d = test_dir!(
      "gallery-config.json": r#"{"version": "1.0.0", "categories": [
        {"id": "nature", "name": "Nature", "description": "", "items": []}
      ]}"#,
    );
    let (tools, clock) = (FakeTools::new(), FixedClock::at(2024, 5, 1, 12, 0, 0));

    let g = Gallery::load(d.root(), &tools, &clock).unwrap();

    assert_eq!(g.catalog().categories.len(), 1);
    assert_eq!(g.catalog().categories[0].id, "nature");
  }

  #[test]
  fn errors_on_invalid_manifest() {
    let d = test_dir!(
      "gallery-config.json": r#"{"version": "1.0.0"}"#,
    );
    let (tools, clock) = (FakeTools::new(), FixedClock::at(2024, 5, 1, 12, 0, 0));

    let res = Gallery::load(d.root(), &tools, &clock);

    assert_err!(res, Schema, "gallery-config.json: Catalog does not match");
  }
}
