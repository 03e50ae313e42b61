//! Shared helpers: content hashing, path/URL handling, pluralization.

pub mod hash;
pub mod path;
mod plural;

pub use plural::plural_count;
