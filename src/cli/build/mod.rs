//! Project build orchestration.
//!
//! Build pipeline phases:
//! - **Clean** - Remove the destination (or just its versioned directories)
//! - **Copy** - Copy `copy` globs verbatim
//! - **Entry** - Minify and version the entry modules
//! - **Config** - Write the loader configuration with the entry versions
//! - **HTML** - Resolve every document in parallel, then write the report

mod pipeline;
mod report;

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

use crate::{config::ProjectConfig, debug, log, replace::AssetCache, utils::plural_count};

pub use pipeline::{
    addressing, build_entries, create_resolver, expand_globs, resolve_all, resolve_html,
    write_loader_config,
};
pub use report::DependencyReport;

/// Counts shown in the final summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub copied: usize,
    pub entries: usize,
    pub documents: usize,
    pub emitted: usize,
}

/// Build the whole project.
///
/// Pipeline: clean -> copy -> entry -> config -> html -> report
pub fn build_project(config: &ProjectConfig) -> Result<BuildStats> {
    let started = Instant::now();
    let addressing = addressing(config);

    log!("build"; "1/5 clean dest");
    pipeline::clean_dest(config)?;

    log!("build"; "2/5 copy files");
    let copied = pipeline::copy_files(config)?;

    log!("build"; "3/5 build main");
    let versions = build_entries(config, &addressing)?;
    let entries = versions.len();

    log!("build"; "4/5 overwrite config");
    if write_loader_config(config, &versions)?.is_none() {
        log!("build"; "no coolie-config, skipped");
    }

    log!("build"; "5/5 build html css");
    let files = expand_globs(config.src_root(), &config.html.src)?;
    let cache = Arc::new(AssetCache::new());
    let resolver = create_resolver(config, addressing.clone(), versions, Arc::clone(&cache));
    let documents = resolve_all(config, &resolver, &files)?;

    DependencyReport::new(&addressing, &documents).write(config.dest_root())?;

    let stats = BuildStats {
        copied,
        entries,
        documents: documents.len(),
        emitted: cache.emitted(),
    };
    debug!("build"; "{} emitted", plural_count(stats.emitted, "asset"));
    log!(
        "done";
        "copy {}, {}, {}, past {} ms",
        plural_count(stats.copied, "file"),
        plural_count(stats.entries, "js file"),
        plural_count(stats.documents, "html file"),
        started.elapsed().as_millis()
    );
    Ok(stats)
}
