//! The file store: every known [`EditorFile`] plus the open-tabs view.
//!
//! Closing a tab only detaches the file from the tabs list; the file itself
//! stays in the store (and in persisted storage) until the process exits.

use chrono::Utc;

use super::file::{EditorFile, FileId};

#[derive(Debug, Default)]
pub struct FileStore {
    files: Vec<EditorFile>,
    /// Open tabs in display order.  Never contains duplicates.
    open: Vec<FileId>,
    active: Option<FileId>,
    next_id: FileId,
}

impl FileStore {
    /// Build a store from previously persisted files.  No tabs are open.
    pub fn from_files(files: Vec<EditorFile>) -> Self {
        let next_id = files.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        Self {
            files,
            open: Vec::new(),
            active: None,
            next_id,
        }
    }

    pub fn files(&self) -> &[EditorFile] {
        &self.files
    }

    pub fn get(&self, id: FileId) -> Option<&EditorFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FileId) -> Option<&mut EditorFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<FileId> {
        self.files.iter().find(|f| f.path == path).map(|f| f.id)
    }

    /// Register a new file and return its id.  Does not open it.
    pub fn create(&mut self, path: &str, content: String) -> FileId {
        let id = self.next_id;
        self.next_id += 1;
        self.files.push(EditorFile::new(id, path, content));
        id
    }

    /// Open `id` in a tab (reusing an existing tab) and make it active.
    /// Returns `false` for an unknown id.
    pub fn open(&mut self, id: FileId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if !self.open.contains(&id) {
            self.open.push(id);
        }
        self.active = Some(id);
        true
    }

    /// Open the file stored under `path`, creating it from `content` first
    /// when the store has never seen that path.
    pub fn open_path(&mut self, path: &str, content: impl FnOnce() -> String) -> FileId {
        let id = match self.find_by_path(path) {
            Some(id) => id,
            None => self.create(path, content()),
        };
        self.open(id);
        id
    }

    /// Close the tab for `id`.  When it was the active tab the next tab to
    /// the right (or else the left) becomes active; closing the last tab
    /// leaves no active file.
    pub fn close(&mut self, id: FileId) {
        let Some(pos) = self.open.iter().position(|&o| o == id) else {
            return;
        };
        self.open.remove(pos);
        if self.active == Some(id) {
            self.active = self
                .open
                .get(pos)
                .or_else(|| pos.checked_sub(1).and_then(|p| self.open.get(p)))
                .copied();
        }
    }

    pub fn open_tabs(&self) -> &[FileId] {
        &self.open
    }

    pub fn active(&self) -> Option<FileId> {
        self.active
    }

    pub fn active_file(&self) -> Option<&EditorFile> {
        self.active.and_then(|id| self.get(id))
    }

    /// Switch to the tab `offset` positions away, wrapping around.
    pub fn cycle_tab(&mut self, offset: isize) {
        if self.open.is_empty() {
            return;
        }
        let len = self.open.len() as isize;
        let current = self
            .active
            .and_then(|a| self.open.iter().position(|&o| o == a))
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.active = Some(self.open[next]);
    }

    /// Replace the content of `id`, recomputing its dirty flag against the
    /// last saved content.  Returns the new dirty flag.
    pub fn update_content(&mut self, id: FileId, text: String) -> bool {
        let Some(file) = self.get_mut(id) else {
            return false;
        };
        if file.content != text {
            file.content = text;
            file.modified = Utc::now();
        }
        file.dirty = file.content != file.baseline();
        file.dirty
    }

    /// Mark `id` as saved: clears the dirty flag and stamps the time.
    pub fn mark_saved(&mut self, id: FileId) {
        if let Some(file) = self.get_mut(id) {
            file.saved_content = Some(file.content.clone());
            file.dirty = false;
            file.modified = Utc::now();
        }
    }

    /// Take `content` as the saved baseline of `id`, e.g. after an export
    /// that finished while the buffer kept changing.
    pub fn mark_saved_as(&mut self, id: FileId, content: String) {
        if let Some(file) = self.get_mut(id) {
            file.dirty = file.content != content;
            file.saved_content = Some(content);
            file.modified = Utc::now();
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.files.iter().filter(|f| f.dirty).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(paths: &[&str]) -> (FileStore, Vec<FileId>) {
        let mut store = FileStore::from_files(Vec::new());
        let ids = paths
            .iter()
            .map(|p| store.create(p, format!("// {p}")))
            .collect();
        (store, ids)
    }

    #[test]
    fn opening_twice_keeps_one_tab() {
        let (mut store, ids) = store_with(&["a.rs", "b.rs"]);
        assert!(store.open(ids[0]));
        assert!(store.open(ids[1]));
        assert!(store.open(ids[0]));
        assert_eq!(store.open_tabs(), &[ids[0], ids[1]]);
        assert_eq!(store.active(), Some(ids[0]));
    }

    #[test]
    fn opening_unknown_id_is_rejected() {
        let mut store = FileStore::from_files(Vec::new());
        assert!(!store.open(42));
        assert!(store.open_tabs().is_empty());
    }

    #[test]
    fn open_path_reuses_existing_file() {
        let mut store = FileStore::from_files(Vec::new());
        let a = store.open_path("src/a.rs", || "one".into());
        let b = store.open_path("src/a.rs", || "two".into());
        assert_eq!(a, b);
        assert_eq!(store.files().len(), 1);
        assert_eq!(store.get(a).unwrap().content, "one");
    }

    #[test]
    fn closing_last_tab_clears_active() {
        let (mut store, ids) = store_with(&["a.rs"]);
        store.open(ids[0]);
        store.close(ids[0]);
        assert!(store.open_tabs().is_empty());
        assert_eq!(store.active(), None);
        // The file itself survives.
        assert!(store.get(ids[0]).is_some());
    }

    #[test]
    fn closing_active_tab_activates_neighbour() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        for &id in &ids {
            store.open(id);
        }
        store.open(ids[1]);
        store.close(ids[1]);
        assert_eq!(store.active(), Some(ids[2]));
        store.close(ids[2]);
        assert_eq!(store.active(), Some(ids[0]));
    }

    #[test]
    fn closing_inactive_tab_keeps_active() {
        let (mut store, ids) = store_with(&["a", "b"]);
        store.open(ids[0]);
        store.open(ids[1]);
        store.close(ids[0]);
        assert_eq!(store.active(), Some(ids[1]));
    }

    #[test]
    fn dirty_tracks_saved_baseline() {
        let (mut store, ids) = store_with(&["a.rs"]);
        let id = ids[0];
        assert!(store.update_content(id, "changed".into()));
        assert_eq!(store.dirty_count(), 1);
        // Editing back to the saved text clears the flag.
        assert!(!store.update_content(id, "// a.rs".into()));

        store.update_content(id, "changed".into());
        store.mark_saved(id);
        assert!(!store.get(id).unwrap().dirty);
        assert!(!store.update_content(id, "changed".into()));
    }

    #[test]
    fn saved_as_keeps_later_edits_dirty() {
        let (mut store, ids) = store_with(&["a.rs"]);
        let id = ids[0];
        store.update_content(id, "exported".into());
        store.update_content(id, "exported plus more".into());
        store.mark_saved_as(id, "exported".into());
        assert!(store.get(id).unwrap().dirty);
        assert!(!store.update_content(id, "exported".into()));
    }

    #[test]
    fn cycle_tab_wraps() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        for &id in &ids {
            store.open(id);
        }
        store.cycle_tab(1);
        assert_eq!(store.active(), Some(ids[0]));
        store.cycle_tab(-1);
        assert_eq!(store.active(), Some(ids[2]));
    }

    #[test]
    fn from_files_continues_ids() {
        let files = vec![
            EditorFile::new(4, "x.md", String::new()),
            EditorFile::new(9, "y.md", String::new()),
        ];
        let mut store = FileStore::from_files(files);
        assert_eq!(store.create("z.md", String::new()), 10);
    }
}
