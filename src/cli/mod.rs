//! Command-line interface module.

mod args;
pub mod build;
pub mod html;

pub use args::{Cli, Commands, HtmlArgs, ResolveArgs};
