//! Add files from disk to a knowledge base.
//!
//! Paths may be single files or directories. Directories are walked and
//! filtered by the `[ingest]` glob sets; explicit file arguments are taken
//! as given. Each file is extracted, hashed, and added unless a document
//! with identical content already exists in the target knowledge base.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use deskmate_core::models::NewDocument;
use deskmate_core::store::{content_hash, KnowledgeBaseStore, Storage};

use crate::config::IngestConfig;
use crate::extract::extract_file;

const DEFAULT_EXCLUDES: [&str; 3] = ["**/.git/**", "**/target/**", "**/node_modules/**"];

/// Outcome of one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// `(file name, document id)` for every document added.
    pub added: Vec<(String, String)>,
    pub skipped_duplicate: Vec<PathBuf>,
    /// `(path, reason)` for files that could not be extracted.
    pub failed: Vec<(PathBuf, String)>,
}

/// Expand `path` into the files to ingest, sorted.
pub fn collect_files(path: &Path, config: &IngestConfig) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Path does not exist: {}", path.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(config.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
        let rel_str = relative.to_string_lossy();
        if exclude_set.is_match(rel_str.as_ref()) || !include_set.is_match(rel_str.as_ref()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Extract and add every file under `paths` to the knowledge base `kb_id`.
pub async fn ingest_paths<S: Storage>(
    store: &mut KnowledgeBaseStore<S>,
    kb_id: &str,
    paths: &[PathBuf],
    config: &IngestConfig,
) -> Result<IngestReport> {
    if store.get(kb_id).is_none() {
        bail!("Knowledge base not found: {}", kb_id);
    }

    let mut files = Vec::new();
    for path in paths {
        files.extend(collect_files(path, config)?);
    }

    let mut report = IngestReport::default();
    for file in files {
        let extracted = match extract_file(&file) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(path = %file.display(), error = %e, "skipping file");
                report.failed.push((file, e.to_string()));
                continue;
            }
        };

        let hash = content_hash(&extracted.content);
        if let Some(existing) = store.find_document_by_hash(kb_id, &hash) {
            warn!(
                path = %file.display(),
                existing = %existing.file_name,
                "skipping duplicate content"
            );
            report.skipped_duplicate.push(file);
            continue;
        }

        let doc = NewDocument {
            file_name: extracted.file_name,
            file_type: extracted.file_type,
            file_size: extracted.file_size,
            content: extracted.content,
        };
        if let Some(added) = store.add_document(kb_id, doc).await? {
            report.added.push((added.file_name, added.id));
        }
    }

    info!(
        kb = %kb_id,
        added = report.added.len(),
        duplicates = report.skipped_duplicate.len(),
        failed = report.failed.len(),
        "ingest finished"
    );
    Ok(report)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmate_core::chunk::ChunkingParams;
    use deskmate_core::store::memory::InMemoryStorage;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.md", "b");
        write(tmp.path(), "a.txt", "a");
        write(tmp.path(), "sub/c.md", "c");
        write(tmp.path(), "image.png", "x");
        write(tmp.path(), "node_modules/pkg/readme.md", "x");
        write(tmp.path(), ".git/notes.txt", "x");

        let files = collect_files(tmp.path(), &IngestConfig::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "sub/c.md"]);
    }

    #[test]
    fn test_collect_custom_excludes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "keep.md", "k");
        write(tmp.path(), "drafts/skip.md", "s");

        let config = IngestConfig {
            exclude_globs: vec!["drafts/**".to_string()],
            ..IngestConfig::default()
        };
        let files = collect_files(tmp.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.md"));
    }

    #[test]
    fn test_collect_single_file_bypasses_globs() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "data.csv", "a,b");
        let files = collect_files(&path, &IngestConfig::default()).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_collect_missing_path() {
        let err = collect_files(Path::new("/nonexistent/deskmate"), &IngestConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_ingest_skips_duplicates_and_failures() {
        let tmp = TempDir::new().unwrap();
        let first = write(tmp.path(), "one.md", "部署流程。\n\n回滚步骤。");
        let copy = write(tmp.path(), "copy.txt", "部署流程。\n\n回滚步骤。");
        let bad = write(tmp.path(), "broken.docx", "not a zip");

        let mut store = KnowledgeBaseStore::open(InMemoryStorage::new(), ChunkingParams::default())
            .await
            .unwrap();
        let kb = store.create("ops", "").await.unwrap();

        let report = ingest_paths(
            &mut store,
            &kb.id,
            &[first, copy.clone(), bad.clone()],
            &IngestConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].0, "one.md");
        assert_eq!(report.skipped_duplicate, vec![copy]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);

        let kb = store.get(&kb.id).unwrap();
        assert_eq!(kb.documents.len(), 1);
        assert_eq!(kb.total_chunks, 1);
    }

    #[tokio::test]
    async fn test_ingest_unknown_kb() {
        let mut store = KnowledgeBaseStore::open(InMemoryStorage::new(), ChunkingParams::default())
            .await
            .unwrap();
        let err = ingest_paths(&mut store, "missing", &[], &IngestConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
