// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! The gallery manifest and the insert-or-update merge applied to it.
//!
//! Categories are an open set keyed by slug; any first tag may create one.
//! Merging never reorders, rewrites, or drops entries other than the single
//! item being merged, so repeated runs produce minimal diffs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Item, slug};
use crate::error::{Error, Result};

/// Version written into newly created manifests.
const CATALOG_VERSION: &str = "1.0.0";

/// A named group of items, keyed by the slug of its first tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id:          String,
  pub name:        String,
  pub description: String,
  pub items:       Vec<Item>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Which category an item belongs to, and how to create that category if it
/// doesn't exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHint {
  pub id:          String,
  pub name:        String,
  pub description: String,
}

impl CategoryHint {
  /// Derives the hint from the first of `tags`.
  pub fn from_tags(tags: &[String]) -> Result<Self> {
    let Some(tag) = tags.first() else {
      return Err(Error::Validation(
        "Cannot pick a category (no tags given).".to_string(),
      ));
    };

    let id = slug::slugify(tag);
    if id.is_empty() {
      return Err(Error::Validation(format!(
        "Cannot pick a category (tag `{tag}` has no usable characters)."
      )));
    }

    Ok(Self {
      id,
      name: slug::title_case(tag),
      description: format!("Beautiful {tag} scenes"),
    })
  }
}

/// The whole manifest.
///
/// Root keys other than `categories` (e.g. `version`, `lastUpdated`,
/// `baseURL`) are carried in `extra`, in document order, ahead of the
/// categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
  pub categories: Vec<Category>,
}

/// Result of merging a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merged {
  Inserted,
  Updated,
}

impl Catalog {
  /// Creates an empty manifest whose relative URLs resolve against
  /// `base_url`.
  pub fn new(last_updated: &str, base_url: &str) -> Self {
    let mut extra = Map::new();
    extra.insert("version".to_string(), Value::from(CATALOG_VERSION));
    extra.insert("lastUpdated".to_string(), Value::from(last_updated));
    extra.insert("baseURL".to_string(), Value::from(base_url));

    Self {
      extra,
      categories: Vec::new(),
    }
  }

  pub fn base_url(&self) -> Option<&str> {
    self.extra.get("baseURL").and_then(Value::as_str)
  }

  /// Sets `baseURL`, keeping the key's position if it already exists.
  /// Returns whether the value changed.
  pub fn set_base_url(&mut self, base_url: &str) -> bool {
    if self.base_url() == Some(base_url) {
      return false;
    }

    self
      .extra
      .insert("baseURL".to_string(), Value::from(base_url));
    true
  }

  /// Parses a manifest, failing if it doesn't have the expected shape.
  pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
    serde_json::from_slice(json.as_ref())
      .map_err(|e| Error::Schema(format!("Catalog does not match expected layout ({e}).")))
  }

  /// Serializes the manifest with two-space indentation and a trailing newline.
  pub fn to_json(&self) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(self)
      .map_err(|e| Error::Schema(format!("Failed to serialize catalog ({e}).")))?;
    json.push(b'\n');

    Ok(json)
  }

  /// Inserts `item` into the category named by `hint`, creating the category
  /// at the end of the list if needed. If the category already holds an item
  /// with the same id, that item is replaced in place, keeping its original
  /// `createdAt`.
  pub fn merge(&mut self, mut item: Item, hint: &CategoryHint) -> Result<Merged> {
    if item.id.is_empty() {
      return Err(Error::Validation(format!(
        "`{}`: Cannot merge item (empty id).",
        item.title
      )));
    }
    if hint.id.is_empty() {
      return Err(Error::Validation(format!(
        "{}: Cannot merge item (empty category id).",
        item.id
      )));
    }

    let category = self.get_or_insert_category(hint);

    if let Some(existing) = category.items.iter_mut().find(|i| i.id == item.id) {
      item.created_at = std::mem::take(&mut existing.created_at);
      *existing = item;
      Ok(Merged::Updated)
    } else {
      category.items.push(item);
      Ok(Merged::Inserted)
    }
  }

  /// Finds the item `item_id` within category `category_id`.
  pub fn find(&self, category_id: &str, item_id: &str) -> Option<&Item> {
    self
      .categories
      .iter()
      .find(|c| c.id == category_id)?
      .items
      .iter()
      .find(|i| i.id == item_id)
  }

  /// Ids of all categories other than `category_id` holding an item `item_id`.
  pub fn other_categories_with(&self, category_id: &str, item_id: &str) -> Vec<&str> {
    self
      .categories
      .iter()
      .filter(|c| c.id != category_id && c.items.iter().any(|i| i.id == item_id))
      .map(|c| c.id.as_str())
      .collect()
  }

  /// Iterates over every item in document order.
  pub fn iter_items(&self) -> impl Iterator<Item = &Item> {
    self.categories.iter().flat_map(|c| c.items.iter())
  }

  /// Drops every item for which `keep` returns false, returning the
  /// `(category id, item id)` of each one removed. Categories are kept even
  /// when left empty.
  pub fn retain_items(&mut self, mut keep: impl FnMut(&Item) -> bool) -> Vec<(String, String)> {
    let mut removed = Vec::new();

    for category in &mut self.categories {
      category.items.retain(|item| {
        let kept = keep(item);
        if !kept {
          removed.push((category.id.clone(), item.id.clone()));
        }
        kept
      });
    }

    removed
  }

  /// Points every item's thumbnail at its main image, returning the ids of
  /// the items changed.
  pub fn sync_thumbnails(&mut self) -> Vec<String> {
    let mut changed = Vec::new();

    for item in self.categories.iter_mut().flat_map(|c| c.items.iter_mut()) {
      if item.thumbnail() != Some(item.image_url.as_str()) {
        item.thumbnail_url = Some(Some(item.image_url.clone()));
        changed.push(item.id.clone());
      }
    }

    changed
  }

  /// Records `timestamp` as the manifest's `lastUpdated`, keeping the key's
  /// position if it already exists.
  pub fn touch(&mut self, timestamp: &str) {
    self
      .extra
      .insert("lastUpdated".to_string(), Value::from(timestamp));
  }

  fn get_or_insert_category(&mut self, hint: &CategoryHint) -> &mut Category {
    let index = match self.categories.iter().position(|c| c.id == hint.id) {
      Some(index) => index,
      None => {
        log::debug!("{}: Creating category.", hint.id);
        self.categories.push(Category {
          id:          hint.id.clone(),
          name:        hint.name.clone(),
          description: hint.description.clone(),
          items:       Vec::new(),
          extra:       Map::new(),
        });
        self.categories.len() - 1
      }
    };

    &mut self.categories[index]
  }
}




#[cfg(test)]
mod test_to_json {
  use super::*;

  #[test]
  fn round_trips_document_unchanged() {
    let json = r#"{
  "version": "1.0.0",
  "lastUpdated": "2024-01-01T00:00:00+00:00",
  "baseURL": "https://example.com/gallery",
  "categories": [
    {
      "id": "nature",
      "name": "Nature",
      "description": "Beautiful nature scenes",
      "items": [
        {
          "id": "forest",
          "title": "Forest",
          "description": "Custom Live Photo from HEIC",
          "imageURL": "images/forest.HEIC",
          "videoURL": "",
          "thumbnailURL": "images/forest.HEIC",
          "isPremium": false,
          "tags": [
            "nature"
          ],
          "duration": 1.0,
          "size": {
            "bytes": 2048,
            "formatted": "2.0 KB"
          },
          "createdAt": "2024-01-01T00:00:00.000000+00:00",
          "featured": true
        }
      ],
      "icon": "leaf"
    }
  ]
}
"#;

    let c = Catalog::from_json(json).unwrap();

    assert_eq!(String::from_utf8(c.to_json().unwrap()).unwrap(), json);
  }

  #[test]
  fn new_catalog_is_versioned_and_empty() {
    let c = Catalog::new("2024-01-01T00:00:00+00:00", "https://example.com/gallery");

    let json = String::from_utf8(c.to_json().unwrap()).unwrap();

    assert_eq!(
      json,
      r#"{
  "version": "1.0.0",
  "lastUpdated": "2024-01-01T00:00:00+00:00",
  "baseURL": "https://example.com/gallery",
  "categories": []
}
"#
    );
  }
}
