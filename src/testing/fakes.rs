// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Stand-ins for `ExifTool`, `ffprobe` and the system clock.

use std::{
  collections::{HashMap, HashSet},
  fs,
  path::Path,
};

use chrono::{DateTime, TimeZone, Utc};

use crate::io::{Clock, MediaTools};

/// `MediaTools` answering from in-memory tables keyed by file name.
///
/// A fake video's bytes are its duration in text form, so probing the written
/// `.mov` reads the duration back.
#[derive(Default)]
pub struct FakeTools {
  videos:  HashMap<String, f64>,
  failing: HashSet<String>,
}

impl FakeTools {
  pub fn new() -> Self {
    Self::default()
  }

  /// `file_name` is a Live Photo whose video lasts `duration` seconds.
  pub fn with_video(mut self, file_name: &str, duration: f64) -> Self {
    self.videos.insert(file_name.to_string(), duration);
    self
  }

  /// Extracting from `file_name` fails as if `ExifTool` crashed.
  pub fn failing(mut self, file_name: &str) -> Self {
    self.failing.insert(file_name.to_string());
    self
  }
}

fn name_of(file: &Path) -> String {
  file
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default()
}

impl MediaTools for FakeTools {
  fn extract_video(&self, file: &Path) -> Result<Option<Vec<u8>>, String> {
    let name = name_of(file);

    if self.failing.contains(&name) {
      return Err(format!("exiftool did not run successfully ({name})."));
    }

    Ok(self.videos.get(&name).map(|d| d.to_string().into_bytes()))
  }

  fn probe_duration(&self, file: &Path) -> Result<f64, String> {
    let contents = fs::read_to_string(file).map_err(|e| format!("{}: {e}", file.display()))?;

    contents
      .parse::<f64>()
      .map(|d| (d * 10.0).round() / 10.0)
      .map_err(|e| format!("{}: {e}", file.display()))
  }
}

/// `Clock` stuck at a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
    Self(
      Utc
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_else(|| panic!("Invalid date & time: {year}-{month}-{day}T{hour}:{min}:{sec}")),
    )
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}
