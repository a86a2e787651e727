//! Background disk writes so the UI thread never blocks on I/O.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::core::file::FileId;

pub enum IoUpdate {
    Exported {
        file: FileId,
        path: PathBuf,
        /// Content that was written, so the store can take it as the new
        /// saved baseline.
        content: String,
        result: std::io::Result<()>,
    },
}

/// Write `content` to `path` on a worker thread, creating parent
/// directories as needed.
pub fn spawn_export(
    tx: mpsc::UnboundedSender<IoUpdate>,
    file: FileId,
    path: PathBuf,
    content: String,
) {
    std::thread::spawn(move || {
        let result = write_file(&path, &content);
        let _ = tx.send(IoUpdate::Exported {
            file,
            path,
            content,
            result,
        });
    });
}

fn write_file(path: &std::path::Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn export_writes_file_and_reports_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/a.txt");
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_export(tx, 7, path.clone(), "hello".to_string());

        let IoUpdate::Exported {
            file, result, ..
        } = rx.recv().await.unwrap();
        assert_eq!(file, 7);
        assert!(result.is_ok());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
