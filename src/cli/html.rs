//! Html command implementation.
//!
//! Resolves only the documents named on the command line. Entry modules are
//! still built first, since loader tags need their versions.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use super::build::{
    addressing, build_entries, create_resolver, resolve_all, resolve_html, write_loader_config,
};
use crate::cli::HtmlArgs;
use crate::config::ProjectConfig;
use crate::{log, logger};
use crate::replace::{AssetCache, ResolvedHtml};
use crate::utils::path::absolutize;
use crate::utils::plural_count;

/// Run the html command.
pub fn run_html(config: &ProjectConfig, args: &HtmlArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current working directory")?;
    let files = select_files(config, &args.files, &cwd)?;

    // stdout carries the documents only
    logger::set_quiet(args.stdout);

    let addressing = addressing(config);
    let versions = build_entries(config, &addressing)?;
    write_loader_config(config, &versions)?;

    let resolver = create_resolver(config, addressing, versions, Arc::new(AssetCache::new()));

    if args.stdout {
        let mut out = std::io::stdout().lock();
        for file in &files {
            let resolved = resolve_html(&resolver, file)?;
            print_resolved(&mut out, &resolved)?;
        }
        return Ok(());
    }

    let documents = resolve_all(config, &resolver, &files)?;
    log!("html"; "resolved {}", plural_count(documents.len(), "html file"));
    Ok(())
}

/// Absolute paths of the requested documents, which must live in the project.
fn select_files(config: &ProjectConfig, files: &[PathBuf], cwd: &Path) -> Result<Vec<PathBuf>> {
    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        let path = absolutize(file, cwd);
        if !path.is_file() {
            bail!("html file not found: {}", file.display());
        }
        if !path.starts_with(config.src_root()) {
            bail!(
                "html file is outside the project root {}: {}",
                config.src_root().display(),
                file.display()
            );
        }
        selected.push(path);
    }
    selected.dedup();
    Ok(selected)
}

fn print_resolved(out: &mut impl Write, resolved: &ResolvedHtml) -> Result<()> {
    out.write_all(resolved.code.as_bytes())?;
    if !resolved.code.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}
