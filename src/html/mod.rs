//! Light HTML handling: tag matching and attribute access.
//!
//! Deliberately not a parser. [`tags`] finds tag shapes, [`attr`] reads and
//! writes attributes on one tag's source; the resolvers only use these two.

pub mod attr;
pub mod tags;

pub use tags::TagPattern;
