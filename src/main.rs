// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! A small utility for importing HEIC Live Photos into a static gallery,
//! acting as a wrapper around `exiftool` and `ffprobe`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod error;
mod gallery;
mod io;
mod prim;
mod setup;
#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about)]
struct Args {
  /// Gallery root holding `gallery-config.json`. Updates default in
  /// `XDG_CONFIG_HOME`.
  #[arg(short, long, global = true)]
  gallery_root: Option<PathBuf>,

  /// Base URL written to the manifest. Not stored.
  #[arg(short, long, global = true)]
  base_url: Option<String>,

  /// Verbosity level. Max: 2.
  #[arg(short, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Import HEIC Live Photos into the gallery.
  Import {
    /// Mark imported items as premium.
    #[arg(short, long)]
    premium: bool,

    /// Tag for imported items. The first tag names the category.
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// HEIC files, followed by any `--tag` style flags (e.g. `--nature`).
    /// `-p` and `-t TAG` are also accepted after the files.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    inputs: Vec<String>,
  },
  /// Point every thumbnail at its main image.
  Thumbnails,
  /// Remove entries whose image file is missing.
  Prune,
}

fn main() {
  let args = Args::parse();
  setup::configure_logging(args.verbose);

  let root = match setup::get_or_update_gallery_root(args.gallery_root) {
    Ok(path) => path,
    Err(e) => {
      log::error!("{e}");
      std::process::exit(1);
    }
  };

  let base_url = args.base_url.as_deref();
  let success = match args.command {
    Commands::Import {
      premium,
      tags,
      inputs,
    } => commands::import(&root, base_url, inputs, tags, premium),
    Commands::Thumbnails => commands::thumbnails(&root, base_url),
    Commands::Prune => commands::prune(&root, base_url),
  };

  if !success {
    std::process::exit(1);
  }
}
