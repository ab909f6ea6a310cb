//! Arena-backed scratch types for export extraction.
//!
//! While a module is analyzed, every export produces a handful of short-lived
//! strings (names, local names, module specifiers) that all die together when
//! the module's [`barrel_core::ModuleAnalysis`] is built. They are allocated in
//! a [`bumpalo::Bump`] arena, one per worker thread, and only copied into owned
//! strings once per surviving export.
//!
//! ```
//! use bumpalo::Bump;
//! use barrel_parser::arena::StringInterner;
//!
//! let arena = Bump::new();
//! let mut interner = StringInterner::new(&arena);
//!
//! let a = interner.intern("./games");
//! let b = interner.intern("./games");
//! assert!(std::ptr::eq(a.as_str(), b.as_str()));
//! assert_eq!(interner.len(), 1);
//! ```

use std::hash::{Hash, Hasher};

use barrel_core::{ExportDeclaration, ExportKind, FxHashMap};
use bumpalo::Bump;
use camino::Utf8Path;

/// Zero-cost newtype for arena-allocated strings.
///
/// Keeps arena-backed strings from being mixed up with borrowed source text
/// or owned strings.
#[derive(Debug, Clone, Copy)]
pub struct ArenaStr<'a>(&'a str);

impl<'a> ArenaStr<'a> {
    /// Wraps an arena-allocated string slice.
    #[inline]
    #[must_use]
    pub const fn new(s: &'a str) -> Self {
        Self(s)
    }

    /// Returns the underlying string slice.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }
}

impl std::ops::Deref for ArenaStr<'_> {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl PartialEq for ArenaStr<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ArenaStr<'_> {}

impl Hash for ArenaStr<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Display for ArenaStr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Deduplicating string allocator over a [`Bump`] arena.
///
/// Module specifiers repeat heavily within a file (`'./types'` imported and
/// re-exported), so they are interned rather than allocated per use.
pub struct StringInterner<'bump> {
    arena: &'bump Bump,
    interned: FxHashMap<&'bump str, ArenaStr<'bump>>,
}

impl<'bump> StringInterner<'bump> {
    /// Creates an interner backed by the given arena.
    #[inline]
    #[must_use]
    pub fn new(arena: &'bump Bump) -> Self {
        Self {
            arena,
            interned: FxHashMap::default(),
        }
    }

    /// Interns a string, returning the existing allocation if there is one.
    #[inline]
    pub fn intern(&mut self, s: &str) -> ArenaStr<'bump> {
        if let Some(&existing) = self.interned.get(s) {
            return existing;
        }

        let allocated = self.arena.alloc_str(s);
        let arena_str = ArenaStr::new(allocated);
        self.interned.insert(allocated, arena_str);
        arena_str
    }

    /// Allocates a string without interning it.
    #[inline]
    pub fn alloc(&self, s: &str) -> ArenaStr<'bump> {
        ArenaStr::new(self.arena.alloc_str(s))
    }

    /// Number of unique strings interned.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// Returns `true` if nothing was interned.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }

    /// The backing arena.
    #[inline]
    #[must_use]
    pub const fn arena(&self) -> &'bump Bump {
        self.arena
    }
}

/// An export as first extracted, before deduplication and default handling.
#[derive(Debug, Clone, Copy)]
pub struct BumpExport<'bump> {
    /// Exported name.
    pub name: ArenaStr<'bump>,

    /// Provisional kind.
    pub kind: ExportKind,

    /// Local or imported name when renamed, `*` for namespace re-exports.
    pub original_name: Option<ArenaStr<'bump>>,

    /// Re-export source specifier.
    pub reexport_from: Option<ArenaStr<'bump>>,

    /// 1-indexed line.
    pub line: u32,
}

impl BumpExport<'_> {
    /// Returns `true` if the export binds `default`.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name.as_str() == "default"
    }

    /// Copies the export out of the arena.
    #[must_use]
    pub fn to_owned_declaration(&self, path: &Utf8Path) -> ExportDeclaration {
        let mut decl = ExportDeclaration::new(self.name.as_str(), self.kind, path, self.line);
        if let Some(original) = self.original_name {
            decl = decl.with_original_name(original.as_str());
        }
        if let Some(from) = self.reexport_from {
            decl = decl.with_reexport_from(from.as_str());
        }
        decl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_str_equality() {
        let arena = Bump::new();
        let s1 = ArenaStr::new(arena.alloc_str("hello"));
        let s2 = ArenaStr::new(arena.alloc_str("hello"));
        assert_eq!(s1, s2);
        assert!(!std::ptr::eq(s1.as_str(), s2.as_str()));
    }

    #[test]
    fn test_interner_dedups() {
        let arena = Bump::new();
        let mut interner = StringInterner::new(&arena);
        interner.intern("./a");
        interner.intern("./b");
        interner.intern("./a");
        assert_eq!(interner.len(), 2);
        assert!(!interner.is_empty());
    }

    #[test]
    fn test_bump_export_to_owned() {
        let arena = Bump::new();
        let interner = StringInterner::new(&arena);
        let export = BumpExport {
            name: interner.alloc("Api"),
            kind: ExportKind::Named,
            original_name: Some(interner.alloc("api")),
            reexport_from: Some(interner.alloc("./api")),
            line: 4,
        };
        let decl = export.to_owned_declaration(Utf8Path::new("/src/index.ts"));
        assert_eq!(decl.name, "Api");
        assert_eq!(decl.original_name.as_deref(), Some("api"));
        assert_eq!(decl.reexport_from.as_deref(), Some("./api"));
        assert_eq!(decl.line, 4);
    }
}
