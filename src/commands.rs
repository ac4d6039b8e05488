// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Program subcommands for managing the gallery. Each returns whether it fully
//! succeeded.

use std::path::{Path, PathBuf};

use crate::{
  error::Error,
  gallery::{Gallery, ImportReport},
  io::{self, ExternalTools, SystemClock},
  prim::Merged,
};

/// Tag used when none are given, also naming the category.
const DEFAULT_TAG: &str = "custom";

/// Command line inputs of `import`, split by kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Inputs {
  pub files:   Vec<PathBuf>,
  pub tags:    Vec<String>,
  pub premium: bool,
}

/// Imports the HEIC files among `inputs` into the gallery at `root`. Inputs of
/// the form `--tag` are tags, appended after `tags`.
pub fn import(
  root: &Path,
  base_url: Option<&str>,
  inputs: Vec<String>,
  mut tags: Vec<String>,
  premium: bool,
) -> bool {
  let Inputs {
    files,
    tags: input_tags,
    premium: input_premium,
  } = split_inputs(inputs);
  let premium = premium || input_premium;
  tags.extend(input_tags);
  if tags.is_empty() {
    tags.push(DEFAULT_TAG.to_string());
  }

  if files.is_empty() {
    log::error!("No files to import.");
    return false;
  }

  if let Err(e) = io::check_tools() {
    log::error!("{}", Error::Collaborator(e));
    return false;
  }

  let Some(mut gallery) = load(root, base_url) else {
    return false;
  };

  let report = gallery.import(&files, &tags, premium);

  if !save(&mut gallery) {
    return false;
  }

  log_report(&report, files.len());
  report.is_success()
}

/// Points every thumbnail in the gallery at `root` to its main image.
pub fn thumbnails(root: &Path, base_url: Option<&str>) -> bool {
  let Some(mut gallery) = load(root, base_url) else {
    return false;
  };

  let changed = gallery.sync_thumbnails();
  log::info!("Updated {changed} thumbnail(s).");

  save(&mut gallery)
}

/// Removes entries from the gallery at `root` whose image file is missing.
pub fn prune(root: &Path, base_url: Option<&str>) -> bool {
  let Some(mut gallery) = load(root, base_url) else {
    return false;
  };

  let removed = gallery.prune_missing_images();
  log::info!(
    "Removed {} item(s), {} remaining.",
    removed.len(),
    gallery.catalog().iter_items().count()
  );

  save(&mut gallery)
}

/// Splits command line inputs into files and `--tag` flags, keeping order
/// within each. `-p` and `-t TAG` / `--tag TAG` mean the same as before the
/// files. A bare `--` is ignored.
pub fn split_inputs(inputs: Vec<String>) -> Inputs {
  let mut split = Inputs::default();
  let mut inputs = inputs.into_iter();

  while let Some(input) = inputs.next() {
    match input.as_str() {
      "-p" => split.premium = true,
      "-t" | "--tag" => split.tags.extend(inputs.next()),
      "--" => {}
      _ => match input.strip_prefix("--") {
        Some(tag) => split.tags.push(tag.to_string()),
        None => split.files.push(PathBuf::from(input)),
      },
    }
  }

  split
}

fn load(root: &Path, base_url: Option<&str>) -> Option<Gallery<'static>> {
  log::info!("Loading gallery at {}.", root.display());

  let mut gallery = Gallery::load(root, &ExternalTools, &SystemClock)
    .inspect_err(|e| log::error!("{e}"))
    .ok()?;
  if let Some(base_url) = base_url {
    gallery.set_base_url(base_url);
  }

  Some(gallery)
}

fn save(gallery: &mut Gallery<'_>) -> bool {
  gallery
    .save()
    .inspect_err(|e| log::error!("{e}"))
    .is_ok()
}

fn log_report(report: &ImportReport, total: usize) {
  log::info!("Imported {} of {total} file(s).", report.imported.len());

  for imported in &report.imported {
    log::info!(
      "\t{}: `{}` {} - {}{} ({} `{}`)",
      imported.file.display(),
      imported.id,
      imported.title,
      if imported.live { "Live Photo" } else { "Static image" },
      if imported.premium { ", premium" } else { "" },
      match imported.merged {
        Merged::Inserted => "added to",
        Merged::Updated => "updated in",
      },
      imported.category,
    );
  }

  for (_, e) in &report.failed {
    log::error!("{e}");
  }
}
