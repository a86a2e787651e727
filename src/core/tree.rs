//! In-memory explorer tree.
//!
//! The [`TreeItem`] is the fundamental unit – a file or folder of the
//! simulated project.  Items link to their children via indices into an arena
//! (the [`FileTree`] struct), which keeps borrowing trivial when handlers
//! mutate one node while walking others.

use thiserror::Error;

// ───────────────────────────────────────── tree item ─────────

/// Index into [`FileTree::nodes`].
pub type NodeId = usize;

/// A single node in the arena-allocated tree.
#[derive(Debug, Clone)]
pub struct TreeItem {
    pub name: String,
    pub is_folder: bool,
    /// Whether this folder is expanded in the UI (ignored for files).
    pub is_open: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Inline content for files; `None` for folders.
    pub content: Option<String>,
    /// Depth from the root (0 = root).
    pub depth: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must not contain '/'")]
    InvalidName,
    #[error("'{0}' already exists here")]
    AlreadyExists(String),
}

// ───────────────────────────────────────── arena tree ────────

/// Arena-backed explorer tree.  The root is a folder whose name is the
/// project name; it never appears in paths.
#[derive(Debug, Clone)]
pub struct FileTree {
    pub nodes: Vec<TreeItem>,
    pub root: NodeId,
}

impl FileTree {
    /// Create a tree holding only an (open) root folder.
    pub fn new(root_name: &str) -> Self {
        let root = TreeItem {
            name: root_name.to_string(),
            is_folder: true,
            is_open: true,
            parent: None,
            children: Vec::new(),
            content: None,
            depth: 0,
        };
        Self {
            nodes: vec![root],
            root: 0,
        }
    }

    fn push(&mut self, parent_id: NodeId, name: &str, content: Option<String>) -> NodeId {
        let depth = self.nodes[parent_id].depth + 1;
        let id = self.nodes.len();
        self.nodes.push(TreeItem {
            name: name.to_string(),
            is_folder: content.is_none(),
            is_open: false,
            parent: Some(parent_id),
            children: Vec::new(),
            content,
            depth,
        });
        self.nodes[parent_id].children.push(id);
        self.sort_children(parent_id);
        id
    }

    /// Folders before files, each group case-insensitively by name.
    fn sort_children(&mut self, parent_id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[parent_id].children);
        children.sort_by(|&a, &b| {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            b.is_folder
                .cmp(&a.is_folder)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        self.nodes[parent_id].children = children;
    }

    /// Create a new file or folder under `parent_id`.
    ///
    /// When `parent_id` is a file, the item is created next to it.  The
    /// containing folder is opened so the new item is visible.
    pub fn create_item(
        &mut self,
        parent_id: NodeId,
        name: &str,
        is_folder: bool,
    ) -> Result<NodeId, CreateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CreateError::EmptyName);
        }
        if name.contains('/') {
            return Err(CreateError::InvalidName);
        }
        let folder = self.containing_folder(parent_id);
        if self.child_named(folder, name).is_some() {
            return Err(CreateError::AlreadyExists(name.to_string()));
        }
        let content = if is_folder { None } else { Some(String::new()) };
        let id = self.push(folder, name, content);
        self.nodes[folder].is_open = true;
        Ok(id)
    }

    /// `id` itself for folders, the parent folder for files.
    pub fn containing_folder(&self, id: NodeId) -> NodeId {
        let node = &self.nodes[id];
        if node.is_folder {
            id
        } else {
            node.parent.unwrap_or(self.root)
        }
    }

    pub fn child_named(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[folder]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// Insert a file at a slash-separated path, creating missing folders.
    /// An existing file at that path has its content replaced.  A path that
    /// names a folder, or runs through a file, is skipped with a warning.
    pub fn insert_path(&mut self, path: &str, content: String) -> Option<NodeId> {
        let mut current = self.root;
        let mut parts = path.split('/').filter(|p| !p.is_empty()).peekable();
        while let Some(part) = parts.next() {
            let last = parts.peek().is_none();
            current = match self.child_named(current, part) {
                Some(existing) if last && self.nodes[existing].is_folder => {
                    tracing::warn!("skipping file {path:?}: a folder has that path");
                    return None;
                }
                Some(existing) if last => {
                    self.nodes[existing].content = Some(content);
                    return Some(existing);
                }
                Some(existing) if !self.nodes[existing].is_folder => {
                    tracing::warn!("skipping file {path:?}: {part:?} is a file");
                    return None;
                }
                Some(existing) => existing,
                None if last => return Some(self.push(current, part, Some(content))),
                None => self.push(current, part, None),
            };
        }
        tracing::warn!("skipping file with empty path");
        None
    }

    /// Create every missing folder along `path` (closed).
    pub fn insert_folder_path(&mut self, path: &str) -> NodeId {
        let mut current = self.root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = match self.child_named(current, part) {
                Some(existing) => existing,
                None => self.push(current, part, None),
            };
        }
        current
    }

    /// Resolve a slash-separated path relative to the root.
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = self.child_named(current, part)?;
        }
        Some(current)
    }

    /// Slash-separated path of `id` relative to the root (empty for the root).
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            if c == self.root {
                break;
            }
            parts.push(self.nodes[c].name.as_str());
            current = self.nodes[c].parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Iterate node ids that are currently visible (open ancestors), root
    /// first.  This is the flattened list the explorer renders.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_visible(self.root, &mut out);
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let node = &self.nodes[id];
        if node.is_folder && node.is_open {
            for &child in &node.children {
                self.collect_visible(child, out);
            }
        }
    }

    /// All file (leaf) ids in display order, regardless of open state.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_folder {
                stack.extend(node.children.iter().rev());
            } else {
                out.push(id);
            }
        }
        out
    }

    /// Toggle the open state of a node (only if it is a folder).
    pub fn toggle_open(&mut self, id: NodeId) {
        if self.nodes[id].is_folder {
            self.nodes[id].is_open = !self.nodes[id].is_open;
        }
    }

    /// Open every folder on the way to `id`.
    pub fn reveal(&mut self, id: NodeId) {
        let mut current = self.nodes[id].parent;
        while let Some(p) = current {
            self.nodes[p].is_open = true;
            current = self.nodes[p].parent;
        }
    }

    pub fn get(&self, id: NodeId) -> &TreeItem {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeItem {
        &mut self.nodes[id]
    }
}

// ───────────────────────────────────────── sample project ────

/// The project shown on first launch when no workspace is given.
pub fn sample_project() -> FileTree {
    let mut tree = FileTree::new("my-project");
    let files: &[(&str, &str)] = &[
        (
            "src/index.js",
            "import { greet } from './utils/greet.js';\n\nconst app = document.getElementById('app');\napp.textContent = greet('world');\n",
        ),
        (
            "src/utils/greet.js",
            "export function greet(name) {\n  return `Hello, ${name}!`;\n}\n",
        ),
        (
            "src/utils/math.js",
            "export const add = (a, b) => a + b;\nexport const mul = (a, b) => a * b;\n// TODO: handle big numbers\n",
        ),
        (
            "src/styles/main.css",
            "body {\n  margin: 0;\n  font-family: sans-serif;\n}\n\n#app {\n  padding: 1rem;\n}\n",
        ),
        (
            "public/index.html",
            "<!DOCTYPE html>\n<html>\n  <head><title>My Project</title></head>\n  <body>\n    <div id=\"app\"></div>\n    <script type=\"module\" src=\"../src/index.js\"></script>\n  </body>\n</html>\n",
        ),
        (
            "package.json",
            "{\n  \"name\": \"my-project\",\n  \"version\": \"1.0.0\",\n  \"scripts\": {\n    \"start\": \"serve public\"\n  }\n}\n",
        ),
        (
            "README.md",
            "# My Project\n\nA small demo project.\n\nRun `npm start` to serve it.\n",
        ),
    ];
    for (path, content) in files {
        tree.insert_path(path, (*content).to_string());
    }
    if let Some(src) = tree.find_path("src") {
        tree.get_mut(src).is_open = true;
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_path_creates_folders_sorted() {
        let mut tree = FileTree::new("p");
        tree.insert_path("b.txt", "b".into());
        tree.insert_path("src/main.rs", "fn main() {}".into());
        tree.insert_path("a.txt", "a".into());

        let names: Vec<&str> = tree.nodes[tree.root]
            .children
            .iter()
            .map(|&c| tree.get(c).name.as_str())
            .collect();
        assert_eq!(names, ["src", "a.txt", "b.txt"]);
        let main = tree.find_path("src/main.rs").unwrap();
        assert_eq!(tree.path_of(main), "src/main.rs");
        assert_eq!(tree.get(main).content.as_deref(), Some("fn main() {}"));
    }

    #[test]
    fn insert_path_overwrites_existing_file() {
        let mut tree = FileTree::new("p");
        let a = tree.insert_path("x/a.txt", "old".into()).unwrap();
        let b = tree.insert_path("x/a.txt", "new".into()).unwrap();
        assert_eq!(a, b);
        assert_eq!(tree.get(a).content.as_deref(), Some("new"));
    }

    #[test]
    fn insert_path_skips_folder_and_file_conflicts() {
        let mut tree = FileTree::new("p");
        tree.insert_path("x/a.txt", "a".into());
        let before = tree.nodes.len();

        assert!(tree.insert_path("x", "clash".into()).is_none());
        assert!(tree.insert_path("x/a.txt/b.txt", "nested".into()).is_none());
        assert!(tree.insert_path("", "empty".into()).is_none());

        assert_eq!(tree.nodes.len(), before);
        let x = tree.find_path("x").unwrap();
        assert!(tree.get(x).is_folder);
        assert!(tree.get(x).content.is_none());
    }

    #[test]
    fn collapsed_folder_hides_children() {
        let mut tree = sample_project();
        let src = tree.find_path("src").unwrap();
        let index = tree.find_path("src/index.js").unwrap();
        assert!(tree.visible_nodes().contains(&index));
        tree.toggle_open(src);
        assert!(!tree.visible_nodes().contains(&index));
        assert!(tree.visible_nodes().contains(&src));
    }

    #[test]
    fn toggling_a_file_does_nothing() {
        let mut tree = sample_project();
        let readme = tree.find_path("README.md").unwrap();
        tree.toggle_open(readme);
        assert!(!tree.get(readme).is_open);
    }

    #[test]
    fn create_item_next_to_selected_file() {
        let mut tree = sample_project();
        let greet = tree.find_path("src/utils/greet.js").unwrap();
        let id = tree.create_item(greet, "new.js", false).unwrap();
        assert_eq!(tree.path_of(id), "src/utils/new.js");
        assert_eq!(tree.get(id).content.as_deref(), Some(""));
        let utils = tree.find_path("src/utils").unwrap();
        assert!(tree.get(utils).is_open);
    }

    #[test]
    fn create_item_validates_name() {
        let mut tree = sample_project();
        let root = tree.root;
        assert_eq!(tree.create_item(root, "  ", false), Err(CreateError::EmptyName));
        assert_eq!(tree.create_item(root, "a/b", true), Err(CreateError::InvalidName));
        assert_eq!(
            tree.create_item(root, "src", true),
            Err(CreateError::AlreadyExists("src".into()))
        );
        let docs = tree.create_item(root, "docs", true).unwrap();
        assert!(tree.get(docs).is_folder);
        assert!(tree.get(docs).content.is_none());
    }

    #[test]
    fn leaves_lists_every_file_in_order() {
        let tree = sample_project();
        let paths: Vec<String> = tree.leaves().into_iter().map(|l| tree.path_of(l)).collect();
        assert_eq!(paths.first().map(String::as_str), Some("public/index.html"));
        assert!(paths.contains(&"src/utils/math.js".to_string()));
        assert_eq!(paths.len(), 7);
    }

    #[test]
    fn reveal_opens_ancestors() {
        let mut tree = sample_project();
        let html = tree.find_path("public/index.html").unwrap();
        assert!(!tree.visible_nodes().contains(&html));
        tree.reveal(html);
        assert!(tree.visible_nodes().contains(&html));
    }
}
