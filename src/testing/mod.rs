// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Test-only utilities.

mod asserts;
mod fakes;
mod test_dir;

pub use fakes::*;
pub use test_dir::*;

pub use crate::{assert_dir, item, test_dir};

pub fn type_of<T>(_: T) -> &'static str {
  std::any::type_name::<T>()
}

/// Builds an `Item` from a typical document entry, with the given keys
/// overridden.
#[macro_export]
macro_rules! item {
  ({ $($key:literal: $value:tt),* $(,)? }) => {{
    #[allow(unused_mut)]
    let mut value = serde_json::json!({
      "id": "sunset",
      "title": "Sunset",
      "description": "-",
      "imageURL": "images/sunset.HEIC",
      "isPremium": false,
      "tags": ["nature"],
      "duration": 0.0,
      "size": { "bytes": 0, "formatted": "0 bytes" },
      "createdAt": "2024-01-01T00:00:00+00:00",
    });
    $(
      value[$key] = serde_json::json!($value);
    )*
    serde_json::from_value::<$crate::prim::Item>(value).unwrap()
  }};
}
