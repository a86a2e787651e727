//! Import a directory from disk into a [`FileTree`].
//!
//! The walker respects `.gitignore` rules via the [`ignore`] crate.  Only
//! UTF-8 text files up to [`ImportConfig::max_file_bytes`] are imported;
//! everything else is skipped silently (and counted).

use std::path::Path;

use ignore::WalkBuilder;

use super::tree::FileTree;

/// Configuration knobs for the import walk.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Maximum depth to descend (1 = immediate children only).
    pub max_depth: usize,
    /// Respect `.gitignore` files.
    pub respect_gitignore: bool,
    /// Import hidden (dot-prefixed) entries.
    pub show_hidden: bool,
    /// Larger files are skipped.
    pub max_file_bytes: u64,
    /// Stop after this many files.
    pub max_files: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            respect_gitignore: true,
            show_hidden: false,
            max_file_bytes: 512 * 1024,
            max_files: 2000,
        }
    }
}

/// What an import produced.
#[derive(Debug)]
pub struct ImportReport {
    pub tree: FileTree,
    pub imported: usize,
    pub skipped: usize,
}

/// Build a [`FileTree`] mirroring `root`.
///
/// Folders are created as they are encountered, so empty directories appear
/// too; files that are binary, too large or unreadable are skipped.
pub fn import_dir(root: &Path, config: &ImportConfig) -> anyhow::Result<ImportReport> {
    let meta = std::fs::metadata(root)?;
    anyhow::ensure!(meta.is_dir(), "{} is not a directory", root.display());

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut tree = FileTree::new(&root_name);
    let mut imported = 0;
    let mut skipped = 0;

    let walker = WalkBuilder::new(root)
        .max_depth(Some(config.max_depth))
        .hidden(!config.show_hidden)
        .git_ignore(config.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path == root {
            continue;
        }
        let Some(rel) = relative_path(root, path) else {
            continue;
        };
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            tree.insert_folder_path(&rel);
            continue;
        }
        if imported >= config.max_files {
            skipped += 1;
            continue;
        }
        match read_text(path, config.max_file_bytes) {
            Some(content) => {
                tree.insert_path(&rel, content);
                imported += 1;
            }
            None => skipped += 1,
        }
    }

    tracing::info!(
        "imported {imported} files from {} ({skipped} skipped)",
        root.display()
    );
    Ok(ImportReport {
        tree,
        imported,
        skipped,
    })
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn read_text(path: &Path, max_bytes: u64) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > max_bytes {
        return None;
    }
    let bytes = std::fs::read(path).ok()?;
    if bytes.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
