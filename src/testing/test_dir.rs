// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Helper for setting up test directories with gallery files.

use std::{
  collections::{HashSet, VecDeque},
  env,
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

static TEST_ROOT: LazyLock<PathBuf> =
  LazyLock::new(|| env::temp_dir().join(format!("{}_tests", env!("CARGO_PKG_NAME"))));

/// Helper for creating directories for tests needing actual files.
pub struct TestDir {
  root: PathBuf,
}

impl TestDir {
  /// Creates a new directory under `TEST_ROOT` for tests involving file
  /// operations. Note: Prefer using `test_dir!()` macro.
  pub fn new(test_path: PathBuf, files: Vec<(&'static str, &'static str)>) -> Self {
    let root_rel = TEST_ROOT.join(test_path);
    if root_rel.exists() {
      fs::remove_dir_all(&root_rel).unwrap();
    }
    fs::create_dir_all(&root_rel).unwrap();

    let root = root_rel.canonicalize().unwrap();

    for (file, contents) in files {
      let full_path = root.join(file);

      assert!(!full_path.exists(), "File already exists: {full_path:?}");
      fs::create_dir_all(full_path.parent().unwrap()).unwrap();
      fs::write(&full_path, contents).unwrap();
    }

    Self { root }
  }

  pub fn files(&self) -> HashSet<PathBuf> {
    let mut dirs = VecDeque::from([self.root.clone()]);
    let mut files = HashSet::new();

    while let Some(dir) = dirs.pop_front() {
      for entry in fs::read_dir(dir).unwrap().map(Result::unwrap) {
        let file_type = entry.file_type().unwrap();
        if file_type.is_dir() {
          dirs.push_back(entry.path());
        } else if file_type.is_file() {
          files.insert(entry.path());
        } else {
          panic!("Unexpected file type: {file_type:?}");
        }
      }
    }

    files
  }

  pub fn get_path(&self, file: impl AsRef<Path>) -> PathBuf {
    self.root.join(file)
  }

  pub fn read(&self, file: impl AsRef<Path>) -> String {
    fs::read_to_string(self.get_path(file)).unwrap()
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

#[macro_export]
macro_rules! test_path {
  () => {{
    // HACK: Get module hierarchy for caller.
    let mut function = $crate::testing::type_of(|| ()).rsplit("::");
    // 0th element is `{closure}`.
    let case = function.nth(1).unwrap();
    let suite = function.next().unwrap();
    let module = function.next().unwrap();

    std::path::PathBuf::from(format!("{module}/{suite}/{case}"))
  }};
}

#[macro_export]
macro_rules! test_dir {
  ($($file:literal: $contents:literal),* $(,)?) => {{
    let files: Vec<(&'static str, &'static str)> = vec![$(($file, $contents)),*];
    $crate::testing::TestDir::new($crate::test_path!(), files)
  }};
}
