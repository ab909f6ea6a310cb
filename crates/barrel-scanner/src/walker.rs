//! Source tree discovery.
//!
//! This module provides [`TreeWalker`], which uses the `ignore` crate to walk
//! a root directory (respecting `.gitignore`) and builds the pass's
//! [`DirectoryTree`]: every directory with its direct source files, its child
//! directories, and the state of its barrel file name.
//!
//! # Examples
//!
//! ```no_run
//! use barrel_core::GenerateConfig;
//! use barrel_scanner::TreeWalker;
//!
//! let config = GenerateConfig { root_path: "src".into(), ..GenerateConfig::default() };
//! let tree = TreeWalker::from_config(&config)?.discover()?;
//! for dir in tree.iter() {
//!     println!("{}: {} files", dir.path, dir.files.len());
//! }
//! # Ok::<(), barrel_scanner::ScanError>(())
//! ```

use std::io::{BufRead, BufReader};

use barrel_core::{BarrelState, Directory, DirectoryTree, GenerateConfig, GENERATED_MARKER};
use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::ScanError;

/// Directories that are always skipped during traversal.
const SKIP_DIRECTORIES: &[&str] = &["node_modules", ".git"];

/// Walks a source root and builds a [`DirectoryTree`].
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: Utf8PathBuf,
    categories: Vec<String>,
    extensions: Vec<String>,
    barrel_file_name: String,
    skip_dirs: Vec<String>,
    follow_links: bool,
}

impl TreeWalker {
    /// Creates a walker for `root` with default settings.
    ///
    /// The root is canonicalized so every discovered path is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root does not exist or is not a
    /// directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }
        let root = root
            .canonicalize_utf8()
            .map_err(|e| ScanError::config(format!("cannot resolve root {root}: {e}")))?;

        let defaults = GenerateConfig::default();
        Ok(Self {
            root,
            categories: Vec::new(),
            extensions: defaults.source_extensions,
            barrel_file_name: defaults.barrel_file_name,
            skip_dirs: defaults.skip_dirs,
            follow_links: false,
        })
    }

    /// Creates a walker configured from a [`GenerateConfig`].
    ///
    /// # Errors
    ///
    /// See [`TreeWalker::new`]. Also fails if a category is not a directory.
    pub fn from_config(config: &GenerateConfig) -> Result<Self, ScanError> {
        let walker = Self::new(&config.root_path)?
            .with_categories(config.categories.iter().cloned())
            .with_extensions(config.source_extensions.iter().cloned())
            .with_barrel_file_name(&config.barrel_file_name)
            .with_skip_dirs(config.skip_dirs.iter().cloned())
            .with_follow_links(config.follow_links);

        for category in &walker.categories {
            if !walker.root.join(category).is_dir() {
                return Err(ScanError::config(format!(
                    "category is not a directory: {category}"
                )));
            }
        }
        Ok(walker)
    }

    /// Restricts discovery to these top-level subdirectories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = String>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Sets the source file extensions (without dots).
    #[must_use]
    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = String>) -> Self {
        self.extensions = extensions.into_iter().collect();
        self
    }

    /// Sets the barrel file name.
    #[must_use]
    pub fn with_barrel_file_name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.barrel_file_name);
        self
    }

    /// Replaces the configurable skip list. `node_modules` and `.git` are always skipped.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: impl IntoIterator<Item = String>) -> Self {
        self.skip_dirs = dirs.into_iter().collect();
        self
    }

    /// Sets whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// The canonical root directory.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Walks the root and builds the directory tree.
    ///
    /// With categories configured, only the root and the category subtrees
    /// are included, and the root contributes no direct files.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if traversal fails and
    /// [`ScanError::NonUtf8Path`] for paths that are not UTF-8.
    pub fn discover(&self) -> Result<DirectoryTree, ScanError> {
        let mut tree = DirectoryTree::new(self.root.clone());
        tree.insert(Directory::new(self.root.clone(), 0));

        for result in self.build_walker() {
            let entry = result?;
            let path = Utf8Path::from_path(entry.path())
                .ok_or_else(|| ScanError::NonUtf8Path(entry.path().to_owned()))?;
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let depth = relative.components().count();
            if depth == 0 {
                continue;
            }

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if tree.get(path).is_none() {
                    tree.insert(Directory::new(path.to_owned(), depth));
                }
            } else if file_type.is_file() {
                self.add_file(&mut tree, path, depth);
            }
        }

        link_children(&mut tree);
        debug!(
            root = %self.root,
            directories = tree.len(),
            files = tree.files().count(),
            "discovered source tree"
        );
        Ok(tree)
    }

    fn add_file(&self, tree: &mut DirectoryTree, path: &Utf8Path, depth: usize) {
        let Some(parent) = path.parent() else {
            return;
        };
        // Categories restrict the root to aggregating its subtrees.
        if depth == 1 && !self.categories.is_empty() {
            return;
        }
        let is_barrel = path.file_name() == Some(self.barrel_file_name.as_str());
        let is_source = self.is_source_file(path);
        if !is_barrel && !is_source {
            return;
        }

        if tree.get(parent).is_none() {
            tree.insert(Directory::new(parent.to_owned(), depth - 1));
        }
        let Some(dir) = tree.get_mut(parent) else {
            return;
        };
        if is_barrel {
            dir.barrel = barrel_state(path);
        } else {
            dir.files.push(path.to_owned());
        }
    }

    fn build_walker(&self) -> ignore::Walk {
        let skip: Vec<String> = SKIP_DIRECTORIES
            .iter()
            .map(|d| (*d).to_owned())
            .chain(self.skip_dirs.iter().cloned())
            .collect();
        let categories = self.categories.clone();

        WalkBuilder::new(&self.root)
            .standard_filters(true)
            .follow_links(self.follow_links)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if skip.iter().any(|d| *d == name) {
                    return false;
                }
                categories.is_empty() || entry.depth() > 1 || categories.iter().any(|c| *c == name)
            })
            .build()
    }

    fn is_source_file(&self, path: &Utf8Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if name.ends_with(".d.ts") || name.ends_with(".d.mts") {
            return false;
        }
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Reads the first line of an existing barrel-named file.
fn barrel_state(path: &Utf8Path) -> BarrelState {
    let Ok(file) = std::fs::File::open(path) else {
        return BarrelState::Foreign;
    };
    let mut first_line = String::new();
    if BufReader::new(file).read_line(&mut first_line).is_err() {
        return BarrelState::Foreign;
    }
    if first_line.trim_end() == GENERATED_MARKER {
        BarrelState::Generated
    } else {
        BarrelState::Foreign
    }
}

/// Fills in `children` and sorts file lists.
fn link_children(tree: &mut DirectoryTree) {
    let paths: Vec<Utf8PathBuf> = tree.iter().map(|d| d.path.clone()).collect();
    for path in &paths {
        if let Some(dir) = tree.get_mut(path) {
            dir.files.sort();
            dir.children.clear();
        }
    }
    for path in &paths {
        if path == &tree.root {
            continue;
        }
        let Some(parent) = path.parent().map(Utf8Path::to_owned) else {
            continue;
        };
        if let Some(dir) = tree.get_mut(&parent) {
            dir.children.push(path.clone());
        }
    }
    for path in &paths {
        if let Some(dir) = tree.get_mut(path) {
            dir.children.sort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Utf8Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, contents).expect("write file");
    }

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned())
            .expect("utf8 tempdir")
            .canonicalize_utf8()
            .expect("canonical tempdir");
        (dir, root)
    }

    #[test]
    fn test_discover_builds_tree() {
        let (_guard, root) = temp_root();
        write(&root, "api/games.ts", "export const a = 1;");
        write(&root, "api/models/user.ts", "export interface User {}");
        write(&root, "api/models/user.d.ts", "declare const x: number;");
        write(&root, "api/readme.md", "# docs");
        write(&root, "node_modules/pkg/index.ts", "export const p = 1;");
        write(&root, "main.ts", "export const main = 1;");

        let tree = TreeWalker::new(&root).expect("walker").discover().expect("discover");

        let api = tree.get(&root.join("api")).expect("api dir");
        assert_eq!(api.files, vec![root.join("api/games.ts")]);
        assert_eq!(api.children, vec![root.join("api/models")]);
        assert_eq!(api.depth, 1);

        let models = tree.get(&root.join("api/models")).expect("models dir");
        assert_eq!(models.files, vec![root.join("api/models/user.ts")]);

        let top = tree.get(&root).expect("root dir");
        assert_eq!(top.files, vec![root.join("main.ts")]);
        assert!(!tree.contains(&root.join("node_modules")));
    }

    #[test]
    fn test_barrel_state_detection() {
        let (_guard, root) = temp_root();
        write(&root, "gen/a.ts", "export const a = 1;");
        write(&root, "gen/index.ts", &format!("{GENERATED_MARKER}\nexport {{ a }} from './a';\n"));
        write(&root, "hand/b.ts", "export const b = 1;");
        write(&root, "hand/index.ts", "export * from './b';\n");

        let tree = TreeWalker::new(&root).expect("walker").discover().expect("discover");

        let generated = tree.get(&root.join("gen")).expect("gen dir");
        assert_eq!(generated.barrel, BarrelState::Generated);
        assert_eq!(generated.files, vec![root.join("gen/a.ts")]);

        let hand = tree.get(&root.join("hand")).expect("hand dir");
        assert_eq!(hand.barrel, BarrelState::Foreign);
    }

    #[test]
    fn test_categories_limit_scope() {
        let (_guard, root) = temp_root();
        write(&root, "api/a.ts", "export const a = 1;");
        write(&root, "web/b.ts", "export const b = 1;");
        write(&root, "root.ts", "export const r = 1;");

        let tree = TreeWalker::new(&root)
            .expect("walker")
            .with_categories(["api".to_owned()])
            .discover()
            .expect("discover");

        assert!(tree.contains(&root.join("api")));
        assert!(!tree.contains(&root.join("web")));
        let top = tree.get(&root).expect("root dir");
        assert!(top.files.is_empty());
        assert_eq!(top.children, vec![root.join("api")]);
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let err = TreeWalker::new(Utf8Path::new("/definitely/not/here")).expect_err("should fail");
        assert!(err.is_fatal());
    }
}
