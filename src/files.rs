//! Markdown file discovery for CLI arguments

use anyhow::Result;
use std::path::{Path, PathBuf};

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "md" || ext == "markdown")
}

/// Expand file arguments: glob patterns, plain files, and directories
/// (markdown files directly inside them). Missing paths are skipped.
pub async fn expand_files(patterns: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern_str = pattern.to_string_lossy();

        if pattern_str.contains('*') {
            for entry in glob::glob(&pattern_str)? {
                let path = entry?;
                if path.is_file() {
                    files.push(path);
                }
            }
        } else if pattern.is_file() {
            files.push(pattern.clone());
        } else if pattern.is_dir() {
            let mut entries = tokio::fs::read_dir(pattern).await?;
            let mut found = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_file() && is_markdown(&path) {
                    found.push(path);
                }
            }
            // read_dir order is platform dependent
            found.sort();
            files.extend(found);
        } else {
            tracing::debug!(path = %pattern.display(), "no such file, skipping");
        }
    }

    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_expand_directory_and_glob() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.markdown"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = expand_files(&[dir.path().to_path_buf()]).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.markdown", "b.md"]);

        let pattern = dir.path().join("*.txt");
        let files = expand_files(&[pattern]).await.unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_paths_skipped() {
        let files = expand_files(&[PathBuf::from("does/not/exist.md")])
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
