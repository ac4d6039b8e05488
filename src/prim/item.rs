// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! A single gallery entry: an image, optionally paired with a Live Photo video.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A key that may be absent (`None`), explicitly `null` (`Some(None)`), or
/// set. Absent and `null` are each written back the way they were read.
#[allow(clippy::option_option)]
pub type Nullable<T> = Option<Option<T>>;

/// Byte count of the image file, alongside its human-readable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
  pub bytes:     u64,
  pub formatted: String,
}

impl Size {
  pub fn new(bytes: u64) -> Self {
    Self {
      bytes,
      formatted: format_size(bytes),
    }
  }
}

/// One entry in a category, as read by the mobile app.
///
/// Field order matches the document layout so that re-serializing an
/// untouched item reproduces it. Keys this program doesn't know about are kept
/// in `extra` and written back after the known ones. `duration` is kept as the
/// number it was written as, so `3` doesn't come back as `3.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id:            String,
  pub title:         String,
  pub description:   String,
  #[serde(rename = "imageURL")]
  pub image_url:     String,
  #[serde(
    rename = "videoURL",
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub video_url:     Nullable<String>,
  #[serde(
    rename = "thumbnailURL",
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub thumbnail_url: Nullable<String>,
  pub is_premium:    bool,
  pub tags:          Vec<String>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub duration:      Nullable<Number>,
  pub size:          Size,
  pub created_at:    String,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Item {
  pub fn video(&self) -> Option<&str> {
    self.video_url.as_ref().and_then(Option::as_deref)
  }

  pub fn thumbnail(&self) -> Option<&str> {
    self.thumbnail_url.as_ref().and_then(Option::as_deref)
  }

  /// Video length in seconds; zero when absent.
  pub fn duration_secs(&self) -> f64 {
    self
      .duration
      .as_ref()
      .and_then(Option::as_ref)
      .and_then(Number::as_f64)
      .unwrap_or(0.0)
  }

  /// Whether this item has a Live Photo video. Older documents store an empty
  /// string or `null` rather than omitting the key.
  pub fn is_live(&self) -> bool {
    self.video().is_some_and(|v| !v.is_empty())
  }
}

/// Wraps a key that is present in the document, so that `null` reads as
/// `Some(None)` rather than as absent.
fn present<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Formats `bytes` for display: plain bytes below 1 KB, otherwise one decimal
/// place in the largest unit that keeps the value under 1024.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
  if bytes < 1024 {
    return format!("{bytes} bytes");
  }

  let mut value = bytes as f64;
  for unit in ["KB", "MB", "GB"] {
    value /= 1024.0;
    if value < 1024.0 {
      return format!("{value:.1} {unit}");
    }
  }

  format!("{:.1} TB", value / 1024.0)
}
