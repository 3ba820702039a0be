/// The plan module turns a batch of audio files into a list of destination paths.
///
/// Failures are per file: a file whose tags cannot be read or whose pattern fails to compile is
/// recorded as skipped and the rest of the batch carries on. Nothing is moved or copied here.
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, TagpathError, TagpathExpectedError};
use crate::metadata::TagDictionary;
use crate::templates::evaluate_template;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub renames: Vec<PlannedRename>,
    pub skipped: Vec<SkippedFile>,
}

/// Recursively collect files under `source_dir` whose extension is one of `extensions`
/// (case-insensitive, without the dot). Paths are returned sorted.
pub fn collect_audio_files(source_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).follow_links(true) {
        let entry = entry.map_err(|e| TagpathError::Generic(format!("Failed to walk {}: {e}", source_dir.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Compile the configured pattern for one file and place the result under the destination
/// directory. A result that is absolute or contains a `..` component is rejected.
pub fn plan_entry(c: &Config, source: &Path, dictionary: &TagDictionary) -> Result<PlannedRename> {
    let relative = PathBuf::from(evaluate_template(&c.path_template, dictionary, &c.sanitizer)?);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
    {
        return Err(TagpathExpectedError::EscapingPath { path: relative }.into());
    }
    Ok(PlannedRename {
        source: source.to_path_buf(),
        destination: c.destination_dir.join(relative),
    })
}

/// Plan a batch of files, reading each file's tags from disk. The output extension is the source
/// file's own extension.
pub fn plan_renames(c: &Config, files: &[PathBuf]) -> Result<RenamePlan> {
    run_batch(c, files, |source| {
        let outcome = TagDictionary::from_file(source).and_then(|dictionary| plan_entry(c, source, &dictionary));
        (source.clone(), outcome)
    })
}

/// Plan a batch of files whose dictionaries the caller has already built.
pub fn plan_renames_from_dictionaries(c: &Config, items: &[(PathBuf, TagDictionary)]) -> Result<RenamePlan> {
    run_batch(c, items, |(source, dictionary)| (source.clone(), plan_entry(c, source, dictionary)))
}

fn run_batch<T, F>(c: &Config, items: &[T], plan_one: F) -> Result<RenamePlan>
where
    T: Sync,
    F: Fn(&T) -> (PathBuf, Result<PlannedRename>) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(c.max_proc)
        .build()
        .map_err(|e| TagpathError::Generic(format!("Failed to build worker pool: {e}")))?;

    // Indexed parallel iterators collect in input order.
    let outcomes: Vec<(PathBuf, Result<PlannedRename>)> = pool.install(|| items.par_iter().map(&plan_one).collect());

    let mut plan = RenamePlan::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(rename) => plan.renames.push(rename),
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", source.display());
                plan.skipped.push(SkippedFile {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }
    tracing::info!("Planned {} renames, skipped {} files", plan.renames.len(), plan.skipped.len());
    Ok(plan)
}
