//! Coolie - a static asset builder for front-end projects.
//!
//! Rewrites the `<link>`/`<script>` tags of HTML documents to versioned,
//! minified outputs, merging duplicate stylesheets across documents.

mod cli;
mod config;
mod html;
mod logger;
mod minify;
mod replace;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_project, html::run_html};
use config::ProjectConfig;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Err(e) = run(&cli) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = ProjectConfig::load(cli)?;

    match &cli.command {
        Commands::Build { .. } => build_project(&config).map(|_| ()),
        Commands::Html { args } => run_html(&config, args),
    }
}
