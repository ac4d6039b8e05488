// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Repairs applied to an existing gallery manifest.

use super::Gallery;

impl Gallery<'_> {
  /// Points every item's thumbnail at its main image. Returns the number of
  /// items changed.
  pub fn sync_thumbnails(&mut self) -> usize {
    log::info!("Pointing thumbnails at main images.");

    let changed = self.catalog.sync_thumbnails();
    for id in &changed {
      log::debug!("{id}: Updated thumbnail.");
    }

    if !changed.is_empty() {
      self.modified = true;
    }

    changed.len()
  }

  /// Removes items whose image is not present under the gallery root.
  /// Returns `(category id, item id)` for each item removed.
  pub fn prune_missing_images(&mut self) -> Vec<(String, String)> {
    log::info!("Removing items with missing images.");

    let root = &self.root;
    let removed = self
      .catalog
      .retain_items(|item| root.join(&item.image_url).is_file());

    for (category, id) in &removed {
      log::warn!("{category}/{id}: Image missing, removing item.");
    }

    if !removed.is_empty() {
      self.modified = true;
    }

    removed
  }
}
