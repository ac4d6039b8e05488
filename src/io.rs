// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Functions for manipulating files, and the external tools (`ExifTool`,
//! `ffprobe`) and clock the gallery depends on.

use std::{
  ffi::{OsStr, OsString},
  fs,
  path::{Path, PathBuf},
  process::{Command, Output},
};

use chrono::{DateTime, SecondsFormat, Utc};

/// Minimum supported (tested) version of `ExifTool`.
const EXIFTOOL_MIN_VERSION: (u32, u32) = (12, 0);

/// `ExifTool` tags holding the video half of a Live Photo, in order of
/// preference. Older HEIC files only carry the second.
const VIDEO_TAGS: [&str; 2] = ["-EmbeddedVideoFile", "-EmbeddedVideo"];

/// Asks `ffprobe` for only the container duration, as a bare number.
const FFPROBE_DURATION_ARGS: [&str; 6] = [
  "-v",
  "quiet",
  "-show_entries",
  "format=duration",
  "-of",
  "default=noprint_wrappers=1:nokey=1",
];

/// Media inspection performed by external tools.
pub trait MediaTools {
  /// Returns the embedded Live Photo video in `file`, or `None` for a static
  /// image.
  fn extract_video(&self, file: &Path) -> Result<Option<Vec<u8>>, String>;

  /// Returns the duration of the video `file` in seconds.
  fn probe_duration(&self, file: &Path) -> Result<f64, String>;
}

/// `MediaTools` backed by `ExifTool` and `ffprobe` found on `PATH`.
pub struct ExternalTools;

impl MediaTools for ExternalTools {
  fn extract_video(&self, file: &Path) -> Result<Option<Vec<u8>>, String> {
    let file = make_canonical(file)?;

    for tag in VIDEO_TAGS {
      let args = [OsStr::new("-b"), OsStr::new(tag), file.as_os_str()];
      let output = run_command("exiftool", args)?;

      // ExifTool reports a missing tag through its exit status on some
      // versions, and with empty output on others.
      if output.status.success() && !output.stdout.is_empty() {
        log::trace!(
          "{}: Found {} bytes of video in `{tag}`.",
          file.display(),
          output.stdout.len()
        );
        return Ok(Some(output.stdout));
      }
    }

    Ok(None)
  }

  fn probe_duration(&self, file: &Path) -> Result<f64, String> {
    let file = make_canonical(file)?;

    let mut args = Vec::from(FFPROBE_DURATION_ARGS.map(OsStr::new));
    args.push(file.as_os_str());

    let stdout = String::from_utf8(run_tool("ffprobe", args)?)
      .map_err(|e| format!("Could not parse ffprobe output as UTF-8 ({e})."))?;

    parse_duration(&stdout)
  }
}

/// Source of the current time, for stamping new items.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Formats `date_time` the way the manifest stores it (RFC 3339, microsecond
/// precision, numeric UTC offset).
pub fn timestamp(date_time: DateTime<Utc>) -> String {
  date_time.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Check that `ExifTool` is present and new enough, and that `ffprobe` runs.
pub fn check_tools() -> Result<(), String> {
  version_check(run_tool("exiftool", ["-ver"])?, EXIFTOOL_MIN_VERSION)?;
  run_tool("ffprobe", ["-version"])?;

  Ok(())
}

/// Copies `file_src` into `dir_dst`, keeping its file name. An existing file
/// at the destination is left as is. Returns the destination and whether a copy
/// was made.
pub fn copy_file(
  file_src: impl AsRef<Path>,
  dir_dst: impl AsRef<Path>,
) -> Result<(PathBuf, bool), String> {
  let file_src = make_canonical(file_src)?;

  let Some(file_name) = file_src.file_name() else {
    return Err(format!("{}: Cannot copy (no file name).", file_src.display()));
  };

  fs::create_dir_all(&dir_dst).map_err(|e| {
    format!(
      "{}: Cannot create directory ({e}).",
      dir_dst.as_ref().display()
    )
  })?;

  let file_dst = dir_dst.as_ref().join(file_name);
  if file_dst.exists() {
    return Ok((file_dst, false));
  }

  fs::copy(&file_src, &file_dst).map_err(|e| {
    format!(
      "{}: Failed to copy to {} ({e}).",
      file_src.display(),
      file_dst.display()
    )
  })?;

  Ok((file_dst, true))
}

/// Size of `file` in bytes.
pub fn file_size(file: impl AsRef<Path>) -> Result<u64, String> {
  fs::metadata(file.as_ref())
    .map(|m| m.len())
    .map_err(|e| format!("{}: Cannot read size ({e}).", file.as_ref().display()))
}

/// Reads `file`, or returns `None` if it doesn't exist.
pub fn read_if_exists(file: impl AsRef<Path>) -> Result<Option<Vec<u8>>, String> {
  let file = file.as_ref();

  if !file.exists() {
    return Ok(None);
  }

  fs::read(file)
    .map(Some)
    .map_err(|e| format!("{}: Cannot read ({e}).", file.display()))
}

/// Writes `contents` to `file`, creating parent directories as needed.
pub fn write_file(file: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<(), String> {
  let file = file.as_ref();

  if let Some(parent) = file.parent() {
    fs::create_dir_all(parent)
      .map_err(|e| format!("{}: Cannot create directory ({e}).", parent.display()))?;
  }

  fs::write(file, contents).map_err(|e| format!("{}: Cannot write ({e}).", file.display()))
}

/// Deletes `file`.
pub fn remove_file(file: impl AsRef<Path>) -> Result<(), String> {
  fs::remove_file(file.as_ref())
    .map_err(|e| format!("{}: Cannot remove ({e}).", file.as_ref().display()))
}

/// Replaces `file` with `contents` by writing a sibling temporary file and
/// renaming it over the original, so readers never see a partial write.
pub fn write_atomic(file: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<(), String> {
  let file = file.as_ref();

  let mut file_tmp = OsString::from(file.as_os_str());
  file_tmp.push(".tmp");
  let file_tmp = PathBuf::from(file_tmp);

  write_file(&file_tmp, contents)?;

  fs::rename(&file_tmp, file).map_err(|e| {
    format!(
      "{}: Cannot replace with {} ({e}).",
      file.display(),
      file_tmp.display()
    )
  })
}

/// Runs `program` with `args`, returning stdout. Errors if the program can't be started or exits
/// unsuccessfully.
fn run_tool<I: IntoIterator<Item = S>, S: AsRef<OsStr>>(
  program: &str,
  args: I,
) -> Result<Vec<u8>, String> {
  let output = run_command(program, args)?;

  if !output.status.success() {
    return Err(format!(
      "{program} did not run successfully.\nstderr:\n{}",
      String::from_utf8_lossy(&output.stderr)
    ));
  }

  Ok(output.stdout)
}

/// Runs `program`, returning its raw output regardless of exit status.
fn run_command<I: IntoIterator<Item = S>, S: AsRef<OsStr>>(
  program: &str,
  args: I,
) -> Result<Output, String> {
  let mut cmd = Command::new(program);
  cmd.args(args);

  let args_joined = cmd
    .get_args()
    .collect::<Vec<_>>()
    .join(OsStr::new(" "));
  log::trace!("Running {program} {}", args_joined.display());

  let output = cmd.output().map_err(|e| {
    format!(
      "{program} failed to run.\nArgs:\n{}\nError:\n{e}",
      args_joined.display()
    )
  })?;

  log::trace!(
    "{program} exited with {} ({} bytes of output).",
    output.status,
    output.stdout.len()
  );

  Ok(output)
}

/// Converts a path to an absolute, canonical form. Errors if `path` does not
/// point to a real file or directory.
fn make_canonical(path: impl AsRef<Path>) -> Result<PathBuf, String> {
  let path = path.as_ref();

  if !path.exists() {
    return Err(format!("{}: Path does not exist.", path.display()));
  }

  path
    .canonicalize()
    .map_err(|e| format!("{}: Path failed to canonicalize ({e}).", path.display()))
}

/// Parses `ffprobe`'s duration output into seconds, rounded to a tenth.
/// Containers without a duration report `N/A`, treated as zero.
fn parse_duration(stdout: &str) -> Result<f64, String> {
  let stdout = stdout.trim();

  if stdout.is_empty() || stdout == "N/A" {
    return Ok(0.0);
  }

  let seconds = stdout
    .parse::<f64>()
    .map_err(|e| format!("Unexpected ffprobe duration: \"{stdout}\" ({e})."))?;
  if !seconds.is_finite() || seconds < 0.0 {
    return Err(format!("Unexpected ffprobe duration: \"{stdout}\" (not a length)."));
  }

  Ok((seconds * 10.0).round() / 10.0)
}

/// Returns whether `version` is as new or newer than `version_required_min`,
/// where `version` is from `ExifTool`'s stdout.
fn version_check(version: Vec<u8>, version_required_min: (u32, u32)) -> Result<(), String> {
  let version = String::from_utf8_lossy(&version);
  let Some((major, minor)) = version.trim().split_once('.') else {
    return Err(format!("Unexpected ExifTool version string: \"{version}\""));
  };

  let major = major.parse::<u32>();
  let minor = minor.parse::<u32>();
  let (Ok(major), Ok(minor)) = (major, minor) else {
    return Err(format!("Unexpected ExifTool version: {version}"));
  };

  if major > version_required_min.0
    || (major == version_required_min.0 && minor >= version_required_min.1)
  {
    Ok(())
  } else {
    Err(format!(
      "ExifTool version {major}.{minor} is too old (needs {}.{} or newer).",
      version_required_min.0, version_required_min.1
    ))
  }
}

#[cfg(test)]
mod test_copy_file {
  use super::*;
  use crate::testing::*;

  #[test]
  fn copies_into_directory() {
    let d = test_dir!(
      "import/IMG_0001.HEIC": "image",
    );

    let (dst, copied) =
      copy_file(d.get_path("import/IMG_0001.HEIC"), d.get_path("images")).unwrap();

    assert!(copied);
    assert_eq!(dst, d.get_path("images/IMG_0001.HEIC"));
    assert_dir!(d, ["import/IMG_0001.HEIC", "images/IMG_0001.HEIC"]);
    assert_eq!(d.read("images/IMG_0001.HEIC"), "image");
  }

  #[test]
  fn keeps_existing_destination() {
    let d = test_dir!(
      "import/IMG_0001.HEIC": "new",
      "images/IMG_0001.HEIC": "old",
    );

    let (dst, copied) =
      copy_file(d.get_path("import/IMG_0001.HEIC"), d.get_path("images")).unwrap();

    assert!(!copied);
    assert_eq!(dst, d.get_path("images/IMG_0001.HEIC"));
    assert_eq!(d.read("images/IMG_0001.HEIC"), "old");
  }

  #[test]
  fn errors_if_source_missing() {
    let d = test_dir!();

    let Err(e) = copy_file(d.get_path("missing.HEIC"), d.get_path("images")) else {
      panic!("Unexpected `Ok`.");
    };

    assert!(e.contains("Path does not exist."), "{e}");
  }
}
