//! The discovered directory tree.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// What currently occupies a directory's barrel file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrelState {
    /// No file with the barrel name.
    #[default]
    Absent,
    /// A barrel previously written by this tool (carries the generated marker).
    Generated,
    /// A hand-written module that happens to use the barrel name.
    Foreign,
}

/// One directory of the tree, as discovered in the current pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Absolute path.
    pub path: Utf8PathBuf,

    /// Direct source files, sorted, excluding the barrel file itself.
    pub files: Vec<Utf8PathBuf>,

    /// Direct child directories, sorted.
    pub children: Vec<Utf8PathBuf>,

    /// State of the barrel file name in this directory.
    pub barrel: BarrelState,

    /// Distance from the tree root (root is 0).
    pub depth: usize,
}

impl Directory {
    /// Creates an empty directory entry.
    #[must_use]
    pub fn new(path: Utf8PathBuf, depth: usize) -> Self {
        Self {
            path,
            files: Vec::new(),
            children: Vec::new(),
            barrel: BarrelState::Absent,
            depth,
        }
    }

    /// Directory name (last path component).
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    /// Returns `true` if any file already uses the barrel name.
    #[must_use]
    pub fn has_existing_barrel(&self) -> bool {
        self.barrel != BarrelState::Absent
    }
}

/// All directories discovered under a root, keyed by path.
///
/// # Examples
///
/// ```
/// use barrel_core::{Directory, DirectoryTree};
///
/// let mut tree = DirectoryTree::new("/src".into());
/// tree.insert(Directory::new("/src".into(), 0));
/// tree.insert(Directory::new("/src/api".into(), 1));
/// tree.insert(Directory::new("/src/api/games".into(), 2));
///
/// let levels = tree.levels_bottom_up();
/// assert_eq!(levels.len(), 3);
/// assert_eq!(levels[0][0].name(), "games");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryTree {
    /// Root of the tree.
    pub root: Utf8PathBuf,

    dirs: BTreeMap<Utf8PathBuf, Directory>,
}

impl DirectoryTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            root,
            dirs: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a directory.
    pub fn insert(&mut self, dir: Directory) {
        self.dirs.insert(dir.path.clone(), dir);
    }

    /// Looks up a directory.
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<&Directory> {
        self.dirs.get(path)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, path: &Utf8Path) -> Option<&mut Directory> {
        self.dirs.get_mut(path)
    }

    /// Returns `true` if `path` is a discovered directory.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.dirs.contains_key(path)
    }

    /// Iterates directories in path order.
    pub fn iter(&self) -> impl Iterator<Item = &Directory> {
        self.dirs.values()
    }

    /// Iterates all direct source files of all directories, in path order.
    pub fn files(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.dirs.values().flat_map(|d| d.files.iter())
    }

    /// Number of directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Returns `true` if no directory was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Groups directories by depth, deepest first.
    ///
    /// Every directory's children appear in an earlier group than the
    /// directory itself, so processing groups in order satisfies the
    /// child-before-parent constraint. Directories within a group are
    /// independent of each other.
    #[must_use]
    pub fn levels_bottom_up(&self) -> Vec<Vec<&Directory>> {
        let max_depth = self.dirs.values().map(|d| d.depth).max().unwrap_or(0);
        let mut levels: Vec<Vec<&Directory>> = vec![Vec::new(); max_depth + 1];
        for dir in self.dirs.values() {
            levels[max_depth - dir.depth].push(dir);
        }
        levels.retain(|level| !level.is_empty());
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_put_children_first() {
        let mut tree = DirectoryTree::new("/r".into());
        tree.insert(Directory::new("/r".into(), 0));
        tree.insert(Directory::new("/r/b".into(), 1));
        tree.insert(Directory::new("/r/a".into(), 1));
        tree.insert(Directory::new("/r/a/x".into(), 2));

        let levels = tree.levels_bottom_up();
        let names: Vec<Vec<&str>> = levels
            .iter()
            .map(|l| l.iter().map(|d| d.name()).collect())
            .collect();
        assert_eq!(names, vec![vec!["x"], vec!["a", "b"], vec!["r"]]);
    }

    #[test]
    fn test_empty_tree_has_no_levels() {
        let tree = DirectoryTree::new("/r".into());
        assert!(tree.levels_bottom_up().is_empty());
        assert!(tree.is_empty());
    }
}
