//! Configuration structures for the barrelgen tool.
//!
//! This module provides configuration types for every stage of a run:
//!
//! - [`GenerateConfig`] - Tree discovery and barrel output settings
//! - [`ResolveConfig`] - Conflict resolution policy (priority table, demotion)
//! - [`HealConfig`] - Self-healing pass limits and enabled fixes
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`]. No priority rules are built
//! in: the table of shared declaration directories is always supplied by the
//! user, usually through a JSON file passed with `--config`.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for tree discovery and barrel output.
///
/// # Examples
///
/// ```
/// use barrel_core::GenerateConfig;
///
/// let config = GenerateConfig::default();
/// assert_eq!(config.barrel_file_name, "index.ts");
/// assert!(config.root_barrel);
/// assert!(config.categories.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Root directory of the source tree.
    pub root_path: Utf8PathBuf,

    /// Top-level subdirectories to process. Empty means the whole root.
    pub categories: Vec<String>,

    /// File name of the generated barrel in every directory.
    pub barrel_file_name: String,

    /// Extensions (without the dot) of files treated as source modules.
    pub source_extensions: Vec<String>,

    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,

    /// Whether symlinked directories are followed during discovery.
    pub follow_links: bool,

    /// Whether the root directory itself receives a barrel.
    pub root_barrel: bool,

    /// Maximum number of parallel analysis jobs.
    /// `None` means use all available CPU cores.
    pub max_parallel_jobs: Option<usize>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            root_path: Utf8PathBuf::new(),
            categories: Vec::new(),
            barrel_file_name: "index.ts".to_owned(),
            source_extensions: ["ts", "tsx", "js", "jsx", "mts"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            skip_dirs: ["node_modules", "dist", "build", ".git", "coverage"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            follow_links: false,
            root_barrel: true,
            max_parallel_jobs: None,
        }
    }
}

impl GenerateConfig {
    /// Returns `true` if `path` has one of the configured source extensions.
    ///
    /// Declaration files (`*.d.ts`) are never treated as source modules.
    #[must_use]
    pub fn is_source_file(&self, path: &Utf8Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if name.ends_with(".d.ts") || name.ends_with(".d.mts") {
            return false;
        }
        path.extension()
            .is_some_and(|ext| self.source_extensions.iter().any(|e| e == ext))
    }

    /// Returns `true` if `path` is named like a generated barrel.
    #[must_use]
    pub fn is_barrel_file(&self, path: &Utf8Path) -> bool {
        path.file_name() == Some(self.barrel_file_name.as_str())
    }
}

/// What happens to a contributor that loses a collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemotionPolicy {
    /// Re-export the loser's whole module under a qualified namespace alias.
    #[default]
    Alias,
    /// Drop the loser's binding for the colliding name entirely.
    Exclude,
}

/// One entry of the priority lookup table.
///
/// A contributor (a file stem or subdirectory name) is canonical for a
/// colliding name when its name equals [`PriorityRule::name`] and it exports
/// every name in [`PriorityRule::expected_declarations`].
///
/// # Examples
///
/// ```
/// use barrel_core::PriorityRule;
///
/// let rule = PriorityRule::new("models").expect_declarations(["ApiResponse"]);
/// assert!(rule.matches("models", |name| name == "ApiResponse"));
/// assert!(!rule.matches("models", |_| false));
/// assert!(!rule.matches("services", |_| true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityRule {
    /// File stem or directory name this rule applies to.
    pub name: String,

    /// Declarations the contributor must actually export to qualify.
    /// Empty means the name alone is enough.
    pub expected_declarations: Vec<String>,
}

impl PriorityRule {
    /// Creates a rule matching on name only.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_declarations: Vec::new(),
        }
    }

    /// Adds expected declarations to the rule.
    #[must_use]
    pub fn expect_declarations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_declarations
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if a contributor called `name` satisfies this rule.
    ///
    /// `exports` answers whether the contributor exposes a given name.
    pub fn matches(&self, name: &str, exports: impl Fn(&str) -> bool) -> bool {
        self.name == name && self.expected_declarations.iter().all(|d| exports(d))
    }
}

/// Conflict resolution policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Priority lookup table, consulted in order.
    pub priority: Vec<PriorityRule>,

    /// Treatment of contributors that lose a collision.
    pub demotion: DemotionPolicy,
}

impl ResolveConfig {
    /// Returns `true` if any rule declares the contributor canonical.
    pub fn is_priority(&self, name: &str, exports: impl Fn(&str) -> bool) -> bool {
        self.priority.iter().any(|rule| rule.matches(name, &exports))
    }
}

/// Self-healing pass settings.
///
/// # Examples
///
/// ```
/// use barrel_core::HealConfig;
///
/// let config = HealConfig::default();
/// assert_eq!(config.max_passes, 5);
/// assert!(config.strip_type_only_defaults);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HealConfig {
    /// Upper bound on analysis/fix passes per run.
    pub max_passes: usize,

    /// Strip default-export statements from type-only modules.
    pub strip_type_only_defaults: bool,

    /// Rewrite consumer imports that no longer match a barrel's shape.
    pub rewrite_stale_imports: bool,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            max_passes: 5,
            strip_type_only_defaults: true,
            rewrite_stale_imports: true,
        }
    }
}

/// Root configuration combining all settings.
///
/// # Examples
///
/// ```
/// use barrel_core::Config;
///
/// let config: Config = serde_json::from_str(
///     r#"{ "resolve": { "priority": [{ "name": "models" }] } }"#,
/// ).expect("valid config");
/// assert_eq!(config.resolve.priority.len(), 1);
/// assert_eq!(config.heal.max_passes, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discovery and output settings.
    pub generate: GenerateConfig,

    /// Conflict resolution policy.
    pub resolve: ResolveConfig,

    /// Self-healing settings.
    pub heal: HealConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration JSON.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heal.max_passes == 0 {
            return Err(ConfigError::invalid_option(
                "heal.max_passes",
                "must be at least 1",
            ));
        }

        let barrel = Utf8Path::new(&self.generate.barrel_file_name);
        if self.generate.barrel_file_name.is_empty() || barrel.file_name().is_none() {
            return Err(ConfigError::invalid_option(
                "generate.barrel_file_name",
                "must be a plain file name",
            ));
        }
        if barrel.components().count() != 1 {
            return Err(ConfigError::invalid_option(
                "generate.barrel_file_name",
                "must not contain path separators",
            ));
        }
        if !self.generate.is_source_file(barrel) {
            return Err(ConfigError::invalid_option(
                "generate.barrel_file_name",
                "extension must be one of generate.source_extensions",
            ));
        }

        if self.resolve.priority.iter().any(|rule| rule.name.is_empty()) {
            return Err(ConfigError::invalid_option(
                "resolve.priority",
                "rule names must not be empty",
            ));
        }

        Ok(())
    }
}
