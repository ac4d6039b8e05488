// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Program setup functions.

use std::{env, fs, io::Write, path::PathBuf};

use env_logger::Builder;
use log::LevelFilter;

/// File under `XDG_CONFIG_HOME` holding the default gallery root.
const CONFIG_NAME: &str = "lpg";

/// Sets up `env_logger` with the format "LEVEL message" (e.g. "WARN something
/// went wrong").
///
/// Log levels:
/// Error: Failed files and fatal errors.
/// Warn: Skipped files, overwritten or removed entries.
/// Info: General program flow.
/// Debug: Detailed file operations.
/// Trace: External tool invocations and output.
pub fn configure_logging(verbosity: u8) {
  let level = match verbosity {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };

  Builder::new()
    .filter_level(level)
    .format(|buf, record| {
      let style = buf.default_level_style(record.level());
      writeln!(buf, "{style}{}{style:#}\t{}", record.level(), record.args())
    })
    .init();
}

/// Gets the gallery root from `path`, if present, and stores it in
/// `XDG_CONFIG_HOME/lpg` as the new default. Else, reads the stored default,
/// falling back to the current directory.
pub fn get_or_update_gallery_root(path: Option<PathBuf>) -> Result<PathBuf, String> {
  let xdg_dirs = xdg::BaseDirectories::new();

  if let Some(path) = path {
    if !path.is_dir() {
      return Err(format!("{}: Gallery root is not a directory.", path.display()));
    }
    let path = path
      .canonicalize()
      .map_err(|e| format!("{}: Path failed to canonicalize ({e}).", path.display()))?;
    let path_str = path
      .to_str()
      .ok_or_else(|| format!("{}: Gallery root is not valid UTF-8.", path.display()))?;

    match xdg_dirs.place_config_file(CONFIG_NAME) {
      Ok(config_path) => {
        if let Err(e) = fs::write(&config_path, path_str) {
          log::warn!("{}: Failed to store gallery root ({e}).", config_path.display());
        }
      }
      Err(e) => log::warn!("Failed to create config directory ({e})."),
    }

    return Ok(path);
  }

  if let Some(config_path) = xdg_dirs.find_config_file(CONFIG_NAME) {
    let stored = fs::read_to_string(&config_path)
      .map_err(|e| format!("{}: Failed to read gallery root ({e}).", config_path.display()))?;
    let path = PathBuf::from(stored.trim());

    if !path.is_dir() {
      return Err(format!(
        "{}: Stored gallery root is not a directory (from {}).",
        path.display(),
        config_path.display()
      ));
    }

    log::debug!("Using gallery root {}.", path.display());
    return Ok(path);
  }

  env::current_dir().map_err(|e| format!("Cannot read current directory ({e})."))
}
