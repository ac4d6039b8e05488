// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Gallery import: copying HEIC Live Photos into the gallery and merging an
//! entry for each into the manifest.

use std::path::{Path, PathBuf};

use serde_json::{Map, Number};

use super::{Gallery, IMAGES_DIR, VIDEOS_DIR};
use crate::{
  error::{Error, Result},
  io,
  prim::{CategoryHint, Item, Merged, Size, slug},
};

/// Description given to every imported item.
const ITEM_DESCRIPTION: &str = "Custom Live Photo from HEIC";

/// Tag that also marks an item premium.
const PREMIUM_TAG: &str = "premium";

/// Extensions accepted for import, compared case-insensitively.
const HEIC_EXTENSIONS: [&str; 2] = ["heic", "heif"];

/// Summary of one successfully imported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
  pub file:     PathBuf,
  pub id:       String,
  pub title:    String,
  pub category: String,
  pub live:     bool,
  pub premium:  bool,
  pub merged:   Merged,
}

/// Outcome of a batch import, in input order.
#[derive(Debug, Default)]
pub struct ImportReport {
  pub imported: Vec<Imported>,
  pub failed:   Vec<(PathBuf, Error)>,
}

impl ImportReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

impl Gallery<'_> {
  /// Imports each of `files` into the category named by the first of `tags`.
  /// A file that fails is skipped and recorded in the report; the rest of the
  /// batch continues.
  pub fn import(&mut self, files: &[PathBuf], tags: &[String], premium: bool) -> ImportReport {
    log::info!(
      "Importing {} file(s) with tags: {}.",
      files.len(),
      tags.join(", ")
    );

    let hint = CategoryHint::from_tags(tags);
    let premium = premium || tags.iter().any(|t| t == PREMIUM_TAG);
    let mut report = ImportReport::default();

    for file in files {
      let result = hint
        .clone()
        .and_then(|hint| self.import_file(file, &hint, tags, premium))
        .map_err(|e| e.in_file(file));

      match result {
        Ok(imported) => report.imported.push(imported),
        Err(e) => {
          log::warn!("Skipping file ({e}).");
          report.failed.push((file.clone(), e));
        }
      }
    }

    report
  }

  /// Errors are relative to `file`, without naming it.
  fn import_file(
    &mut self,
    file: &Path,
    hint: &CategoryHint,
    tags: &[String],
    premium: bool,
  ) -> Result<Imported> {
    log::debug!("{}: Importing.", file.display());

    if !file.is_file() {
      return Err(Error::Collaborator("File not found.".to_string()));
    }
    if !is_heic(file) {
      return Err(Error::Validation("Not a HEIC/HEIF file.".to_string()));
    }

    let slug::Sanitized { id, title } = slug::sanitize(file);
    if id.is_empty() {
      return Err(Error::Validation(
        "Cannot derive an id (file name has no usable characters).".to_string(),
      ));
    }

    let (image, copied) =
      io::copy_file(file, self.root.join(IMAGES_DIR)).map_err(Error::Collaborator)?;
    if copied {
      log::debug!("{}: Copied to {}.", file.display(), image.display());
    } else {
      log::warn!("{}: Already in gallery, keeping existing copy.", image.display());
    }

    let video_url = self.extract_video(file, &id)?;
    if video_url.is_none() {
      self.remove_stale_video(hint, &id)?;
    }
    let duration = match &video_url {
      Some(url) => self
        .tools
        .probe_duration(&self.root.join(url))
        .map_err(Error::Collaborator)?,
      None => 0.0,
    };

    let image_name = image
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let image_url = format!("{IMAGES_DIR}/{image_name}");
    let bytes = io::file_size(&image).map_err(Error::Collaborator)?;

    let item = Item {
      id: id.clone(),
      title: title.clone(),
      description: ITEM_DESCRIPTION.to_string(),
      thumbnail_url: Some(Some(image_url.clone())),
      image_url,
      video_url: video_url.map(Some),
      is_premium: premium,
      tags: tags.to_vec(),
      duration: Number::from_f64(duration).map(Some),
      size: Size::new(bytes),
      created_at: io::timestamp(self.clock.now()),
      extra: Map::new(),
    };

    let live = item.is_live();
    if let Some(existing) = self.catalog.find(&hint.id, &id) {
      log::debug!("{id}: Replacing entry created {}.", existing.created_at);
    }
    let others = self.catalog.other_categories_with(&hint.id, &id);
    if !others.is_empty() {
      log::warn!(
        "{id}: Also present in other categories ({}).",
        others.join(", ")
      );
    }

    let merged = self.catalog.merge(item, hint)?;
    self.modified = true;

    log::info!(
      "{}: {} `{id}` in `{}` ({}).",
      file.display(),
      match merged {
        Merged::Inserted => "Added",
        Merged::Updated => "Updated",
      },
      hint.id,
      if live { "Live Photo" } else { "static image" }
    );

    Ok(Imported {
      file: file.to_path_buf(),
      id,
      title,
      category: hint.id.clone(),
      live,
      premium,
      merged,
    })
  }

  /// Writes the Live Photo video embedded in `file` to `videos/{id}.mov`,
  /// returning its URL relative to the gallery root, or `None` for a static
  /// image.
  fn extract_video(&self, file: &Path, id: &str) -> Result<Option<String>> {
    let Some(video) = self
      .tools
      .extract_video(file)
      .map_err(Error::Collaborator)?
    else {
      log::debug!("{}: No embedded video.", file.display());
      return Ok(None);
    };

    let video_url = video_url(id);
    io::write_file(self.root.join(&video_url), video).map_err(Error::Collaborator)?;
    log::debug!("{}: Extracted video to {video_url}.", file.display());

    Ok(Some(video_url))
  }

  /// Removes `videos/{id}.mov` left over from when the image was a Live
  /// Photo, unless an entry in another category still points at it.
  fn remove_stale_video(&self, hint: &CategoryHint, id: &str) -> Result<()> {
    let video_url = video_url(id);
    let video = self.root.join(&video_url);
    if !video.is_file() {
      return Ok(());
    }

    let shared = self
      .catalog
      .other_categories_with(&hint.id, id)
      .into_iter()
      .filter_map(|c| self.catalog.find(c, id))
      .any(|i| i.video() == Some(video_url.as_str()));
    if shared {
      log::warn!("{video_url}: No longer a Live Photo, kept for other categories.");
      return Ok(());
    }

    io::remove_file(&video).map_err(Error::Collaborator)?;
    log::warn!("{video_url}: No longer a Live Photo, removed video.");

    Ok(())
  }
}

fn video_url(id: &str) -> String {
  format!("{VIDEOS_DIR}/{id}.mov")
}

fn is_heic(file: &Path) -> bool {
  file
    .extension()
    .is_some_and(|e| HEIC_EXTENSIONS.iter().any(|h| e.eq_ignore_ascii_case(h)))
}
