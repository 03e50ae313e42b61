//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// coolie static asset builder
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "coolie.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the whole project into the destination directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Resolve selected HTML files only
    #[command(visible_alias = "h")]
    Html {
        #[command(flatten)]
        args: HtmlArgs,
    },
}

/// Options shared by every command that resolves HTML
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Minify CSS, JS and HTML (overrides every `minify` in the config)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Use the whole-document resolver with `<!--coolie-->` bundles
    #[arg(short = 'L', long)]
    pub legacy: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Remove the destination directory before building
    #[arg(short, long)]
    pub clean: bool,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

/// Html command arguments
#[derive(clap::Args, Debug, Clone)]
pub struct HtmlArgs {
    /// HTML files to resolve (relative to the current directory)
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Print resolved HTML to stdout instead of writing it
    #[arg(short, long)]
    pub stdout: bool,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

impl Cli {
    /// Resolver options of the current command.
    pub fn resolve_args(&self) -> &ResolveArgs {
        match &self.command {
            Commands::Build { build_args } => &build_args.resolve,
            Commands::Html { args } => &args.resolve,
        }
    }
}
