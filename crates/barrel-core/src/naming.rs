//! Identifier derivation and module specifier helpers.
//!
//! Qualified aliases are derived from file and directory names only, never
//! from counters or traversal order, so the alias a contributor receives does
//! not depend on which other contributors happened to be processed first.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::hash::content_hash;

/// Words that cannot be used as a binding name in an ES module.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Converts a file stem or directory name into a camelCase identifier.
///
/// # Examples
///
/// ```
/// use barrel_core::naming::to_identifier;
///
/// assert_eq!(to_identifier("games-service"), "gamesService");
/// assert_eq!(to_identifier("gamesService"), "gamesService");
/// assert_eq!(to_identifier("api.types"), "apiTypes");
/// assert_eq!(to_identifier("2023"), "_2023");
/// assert_eq!(to_identifier("default"), "default_");
/// ```
#[must_use]
pub fn to_identifier(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    for (index, segment) in name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if index == 0 {
            ident.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            ident.extend(first.to_uppercase());
            ident.push_str(chars.as_str());
        }
    }

    if ident.is_empty() {
        return "_".to_owned();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Candidate alias for a contributor at the given escalation level.
///
/// Level 0 is the plain identifier, level 1 appends `Ns`, and level 2
/// appends a short hash of the full name, which separates names that only
/// differ in punctuation or extension. Higher levels also append the level.
#[must_use]
pub fn alias_candidate(name: &str, level: usize) -> String {
    let base = to_identifier(name);
    let hash = content_hash(name) & 0xffff_ffff;
    match level {
        0 => base,
        1 => format!("{base}Ns"),
        2 => format!("{base}_{hash:08x}"),
        _ => format!("{base}_{hash:08x}_{level}"),
    }
}

/// Strips the extension from a module path (`a/b.service.ts` -> `a/b.service`).
#[must_use]
pub fn module_path(path: &Utf8Path) -> Utf8PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_owned(),
    }
}

/// Builds a relative module specifier from `from_dir` to `target`.
///
/// `target` should already be extension-less (see [`module_path`]).
///
/// # Examples
///
/// ```
/// use barrel_core::naming::relative_specifier;
/// use camino::Utf8Path;
///
/// let dir = Utf8Path::new("/src/api");
/// assert_eq!(relative_specifier(dir, Utf8Path::new("/src/api/games")), "./games");
/// assert_eq!(relative_specifier(dir, Utf8Path::new("/src/models/user")), "../models/user");
/// assert_eq!(relative_specifier(dir, Utf8Path::new("/src")), "..");
/// ```
#[must_use]
pub fn relative_specifier(from_dir: &Utf8Path, target: &Utf8Path) -> String {
    let from: Vec<Utf8Component<'_>> = from_dir.components().collect();
    let to: Vec<Utf8Component<'_>> = target.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<&str> = Vec::with_capacity(from.len() + to.len() - 2 * common);
    parts.extend(std::iter::repeat_n("..", from.len() - common));
    parts.extend(to[common..].iter().map(Utf8Component::as_str));

    if parts.is_empty() {
        return ".".to_owned();
    }
    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Resolves a relative module specifier against the importing directory.
///
/// Returns `None` for bare (package) specifiers. The result is normalized
/// lexically; the filesystem is not consulted.
#[must_use]
pub fn resolve_specifier(from_dir: &Utf8Path, specifier: &str) -> Option<Utf8PathBuf> {
    if !(specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }

    let mut resolved = from_dir.to_owned();
    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if !resolved.pop() {
                    return None;
                }
            }
            other => resolved.push(other),
        }
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_separators() {
        assert_eq!(to_identifier("historic_games"), "historic_games");
        assert_eq!(to_identifier("user-profile.model"), "userProfileModel");
        assert_eq!(to_identifier("---"), "_");
    }

    #[test]
    fn test_alias_levels_are_distinct() {
        let level0 = alias_candidate("games.service", 0);
        let level1 = alias_candidate("games.service", 1);
        let level2 = alias_candidate("games.service", 2);
        assert_eq!(level0, "gamesService");
        assert_eq!(level1, "gamesServiceNs");
        assert!(level2.starts_with("gamesService_"));
        assert_ne!(alias_candidate("games.service", 2), alias_candidate("games-service", 2));
        assert_ne!(alias_candidate("games.service", 3), level2);
    }

    #[test]
    fn test_module_path_strips_last_extension() {
        assert_eq!(module_path(Utf8Path::new("/a/b.service.ts")), Utf8PathBuf::from("/a/b.service"));
        assert_eq!(module_path(Utf8Path::new("/a/dir")), Utf8PathBuf::from("/a/dir"));
    }

    #[test]
    fn test_resolve_specifier() {
        let dir = Utf8Path::new("/src/api/games");
        assert_eq!(resolve_specifier(dir, "../models"), Some(Utf8PathBuf::from("/src/api/models")));
        assert_eq!(resolve_specifier(dir, "./x/y"), Some(Utf8PathBuf::from("/src/api/games/x/y")));
        assert_eq!(resolve_specifier(dir, "."), Some(Utf8PathBuf::from("/src/api/games")));
        assert_eq!(resolve_specifier(dir, "react"), None);
    }

    #[test]
    fn test_relative_specifier_roundtrips_through_resolve() {
        let dir = Utf8Path::new("/src/a/b");
        let target = Utf8Path::new("/src/c/d");
        let spec = relative_specifier(dir, target);
        assert_eq!(spec, "../../c/d");
        assert_eq!(resolve_specifier(dir, &spec).as_deref(), Some(target));
    }
}
