// Copyright 2023-5 Seth Pendergrass. See LICENSE.

//! Primitive types for representing the gallery manifest, and the pure
//! operations on them.

mod catalog;
mod item;
pub mod slug;

pub use catalog::*;
pub use item::*;
