//! Build pipeline phases.

use crate::{
    config::ProjectConfig,
    debug,
    logger::ProgressLine,
    minify::minify_js,
    replace::{
        Addressing, AssetCache, HtmlAssetResolver, LinkOptions, ResolvedHtml, ResolverOptions,
        ScriptOptions, VersionMap,
        error::{read_source, write_output},
    },
    utils::path::{
        absolutize, mirror,
        uri::{replace_version, to_root_url},
    },
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

// ============================================================================
// Clean
// ============================================================================

/// Remove stale output.
///
/// With `clean` the whole destination goes; otherwise only the directories
/// holding versioned files, whose names change with every content change.
pub fn clean_dest(config: &ProjectConfig) -> Result<()> {
    let targets = if config.clean {
        vec![config.dest_root().to_path_buf()]
    } else {
        vec![config.css_dir(), config.resource_dir()]
    };

    for dir in targets.iter().filter(|d| d.exists()) {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear directory: {}", dir.display()))?;
        debug!("clean"; "removed {}", dir.display());
    }
    Ok(())
}

// ============================================================================
// Collect
// ============================================================================

/// Expand globs relative to the project root into sorted, unique files.
pub fn expand_globs(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let full = absolutize(Path::new(pattern), root);
        let full = full.to_string_lossy();
        let paths = glob::glob(&full).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        for entry in paths {
            let path = entry.with_context(|| format!("Failed to read glob match of {pattern}"))?;
            if path.is_file() {
                files.push(path_clean::clean(path));
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

// ============================================================================
// Copy
// ============================================================================

/// Copy `copy` globs into the destination, preserving their layout.
pub fn copy_files(config: &ProjectConfig) -> Result<usize> {
    let files = expand_globs(config.src_root(), &config.copy)?;

    files.par_iter().try_for_each(|file| {
        let dest = mirror(file, config.src_root(), config.dest_root());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dest).with_context(|| {
            format!("Failed to copy {} to {}", file.display(), dest.display())
        })?;
        debug!("copy"; "√ {}", config.root_relative(file).display());
        Ok::<_, anyhow::Error>(())
    })?;

    Ok(files.len())
}

// ============================================================================
// Entry modules
// ============================================================================

/// Build entry modules into `<name>.<version>.js` and record their versions.
pub fn build_entries(config: &ProjectConfig, addressing: &Addressing) -> Result<VersionMap> {
    let files = expand_globs(config.src_root(), &config.js.main)?;
    let progress = ProgressLine::new(&[("entry", files.len())]);

    let versions = files
        .par_iter()
        .map(|file| {
            let (dest, version) = build_entry(config, addressing, file)?;
            debug!("entry"; "√ {}", to_root_url(&dest, config.dest_root()));
            progress.inc("entry");
            Ok((file.clone(), version))
        })
        .collect::<Result<Vec<_>>>();

    progress.finish();
    let versions: VersionMap = versions?.into_iter().collect();
    if versions.is_empty() {
        debug!("entry"; "no entry module matched {:?}", config.js.main);
    }
    Ok(versions)
}

fn build_entry(
    config: &ProjectConfig,
    addressing: &Addressing,
    file: &Path,
) -> Result<(PathBuf, String)> {
    let source = read_source(file)?;
    let code = if config.js.minify {
        minify_js(file, &source, &config.js.minify_options)?
    } else {
        source
    };

    let version = addressing.version(&code);
    let mirrored = mirror(file, config.src_root(), config.dest_root());
    let name = mirrored
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("entry module has no file name: {}", file.display()))?;
    let dest = mirrored.with_file_name(replace_version(&name, &version));

    write_output(&dest, code)?;
    Ok((dest, version))
}

// ============================================================================
// Loader config
// ============================================================================

/// Write the loader configuration with the entry versions.
///
/// Returns `None` when no loader config is configured.
pub fn write_loader_config(config: &ProjectConfig, versions: &VersionMap) -> Result<Option<PathBuf>> {
    let (Some(src), Some(dest), Some(base)) = (
        config.js.coolie_config.as_deref(),
        config.loader_config_dest(),
        config.js.base_dir(),
    ) else {
        return Ok(None);
    };

    let code = loader_config_code(src, &base, versions);
    write_output(&dest, code)?;
    debug!("config"; "√ {}", to_root_url(&dest, config.dest_root()));
    Ok(Some(dest))
}

/// `coolie.config({...}).use();` with `base` relative to the config file and
/// versions keyed by module path relative to `base`.
fn loader_config_code(config_src: &Path, base: &Path, versions: &VersionMap) -> String {
    let config_dir = config_src.parent().unwrap_or(base);
    let relative_base = pathdiff::diff_paths(base, config_dir).unwrap_or_else(|| base.to_path_buf());
    let relative_base = to_root_url(&relative_base, Path::new(""));
    let relative_base = match relative_base.trim_matches('/') {
        "" => "./".to_string(),
        rel => format!("./{rel}/"),
    };

    let mut map = serde_json::Map::new();
    for (path, version) in versions.sorted() {
        let key = to_root_url(path, base);
        map.insert(key.trim_start_matches('/').to_string(), version.into());
    }

    let options = serde_json::json!({
        "base": relative_base,
        "version": map,
    });
    format!("coolie.config({options}).use();")
}

// ============================================================================
// HTML
// ============================================================================

/// Resolver over the configured project.
pub fn create_resolver(
    config: &ProjectConfig,
    addressing: Addressing,
    versions: VersionMap,
    cache: Arc<AssetCache>,
) -> HtmlAssetResolver {
    let loader_config = config
        .loader_config_dest()
        .unwrap_or_else(|| config.dest_root().join("coolie-config.js"));
    let base_dir = config
        .js
        .base_dir()
        .unwrap_or_else(|| config.src_root().to_path_buf());

    let options = ResolverOptions {
        mode: config.html.mode,
        addressing,
        link: LinkOptions {
            css_dir: config.css_dir(),
            resource_dir: config.resource_dir(),
            minify: config.css.minify,
            minify_options: config.css.minify_options.clone(),
            sign: config.css.sign,
        },
        script: ScriptOptions {
            base_dir,
            loader_config,
            versions,
            minify: config.js.minify,
            minify_options: config.js.minify_options.clone(),
        },
        minify_html: config.html.minify,
    };
    HtmlAssetResolver::new(options, cache)
}

/// Addressing of the configured project.
pub fn addressing(config: &ProjectConfig) -> Addressing {
    Addressing {
        src_root: config.src_root().to_path_buf(),
        dest_root: config.dest_root().to_path_buf(),
        dest_host: config.dest.host.clone(),
        version_length: config.dest.version_length,
    }
}

/// Resolve one HTML file.
pub fn resolve_html(resolver: &HtmlAssetResolver, file: &Path) -> Result<ResolvedHtml> {
    let code = read_source(file)?;
    let resolved = resolver.resolve(file, &code)?;
    Ok(resolved)
}

/// Resolve every HTML file in parallel and write the results.
///
/// The first failure aborts the pass.
pub fn resolve_all(
    config: &ProjectConfig,
    resolver: &HtmlAssetResolver,
    files: &[PathBuf],
) -> Result<Vec<(PathBuf, ResolvedHtml)>> {
    let progress = ProgressLine::new(&[("html", files.len())]);

    let results = files
        .par_iter()
        .map(|file| {
            let resolved = resolve_html(resolver, file)
                .with_context(|| format!("Failed to resolve {}", config.root_relative(file).display()))?;
            let dest = mirror(file, config.src_root(), config.dest_root());
            write_output(&dest, &resolved.code)?;
            debug!("html"; "√ {}", config.root_relative(file).display());
            progress.inc("html");
            Ok((file.clone(), resolved))
        })
        .collect::<Result<Vec<_>>>();

    progress.finish();
    results
}
