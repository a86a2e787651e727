//! Editor file records and language detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a file in the [`FileStore`](super::store::FileStore).
pub type FileId = u64;

/// A file as seen by the editor surface.
///
/// Only the fields that make sense across restarts are serialised; the dirty
/// flag and the saved snapshot are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorFile {
    pub id: FileId,
    pub name: String,
    /// Slash-separated path inside the explorer tree, e.g. `src/main.rs`.
    pub path: String,
    pub content: String,
    pub language: String,
    #[serde(rename = "lastModified")]
    pub modified: DateTime<Utc>,
    #[serde(skip)]
    pub dirty: bool,
    /// Content as of the last save (or load).  Used to clear the dirty flag
    /// when an edit returns the buffer to its saved state.
    #[serde(skip)]
    pub saved_content: Option<String>,
}

impl EditorFile {
    pub fn new(id: FileId, path: &str, content: String) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            id,
            language: detect_language(&name).to_string(),
            name,
            path: path.to_string(),
            saved_content: Some(content.clone()),
            content,
            modified: Utc::now(),
            dirty: false,
        }
    }

    /// Content the dirty flag is measured against.
    pub fn baseline(&self) -> &str {
        self.saved_content.as_deref().unwrap_or("")
    }
}

/// Map a file name to the language tag handed to the editor widget.
pub fn detect_language(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "dockerfile" => return "dockerfile",
        "makefile" => return "makefile",
        _ => {}
    }
    let Some((_, ext)) = lower.rsplit_once('.') else {
        return "plaintext";
    };
    match ext {
        "rs" => "rust",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "json" => "json",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "md" | "markdown" => "markdown",
        "toml" => "toml",
        "yml" | "yaml" => "yaml",
        "sh" | "bash" => "shell",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "xml" => "xml",
        "sql" => "sql",
        _ => "plaintext",
    }
}
