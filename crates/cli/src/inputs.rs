//! Resolving command-line paths into documents.

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use integrity_core::config::InputConfig;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file given directly is always taken. A directory is walked and filtered
/// by the include/exclude globs; results are sorted for stable output.
pub fn collect_files(path: &Path, cfg: &InputConfig) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("no such file or directory: {}", path.display());
    }

    let include = build_globset(&cfg.include)?;
    let exclude = build_globset(&cfg.exclude)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e.path()) || e.depth() == 0)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let p = entry.path();
        if include.is_match(p) && !exclude.is_match(p) {
            files.push(p.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_document(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).with_context(|| format!("bad glob {}", pat))?);
    }
    Ok(builder.build()?)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hidden_entries_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/old.txt"), "x").unwrap();
        fs::write(dir.path().join(".notes.txt"), "x").unwrap();
        fs::write(dir.path().join("essay.txt"), "x").unwrap();

        let files = collect_files(dir.path(), &InputConfig::default()).unwrap();
        assert_eq!(files, vec![dir.path().join("essay.txt")]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(collect_files(&dir.path().join("nope"), &InputConfig::default()).is_err());
    }
}
