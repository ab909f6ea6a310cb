//! Per-directory conflict resolution.
//!
//! Given everything registered in one directory's scope, the resolver decides
//! for every name how (and whether) it is exposed by the directory's barrel:
//!
//! | Collision | Outcome |
//! |-----------|---------|
//! | Sibling files | A unique priority file keeps the name; every other file is aliased. Without one, all are aliased. |
//! | Direct file vs subdirectory | The direct file keeps the name; subdirectories are aliased (or excluded). |
//! | Subdirectories only | A unique priority subdirectory keeps the name; the rest are aliased (or excluded). Without one, all are aliased. |
//!
//! Aliases are derived from the contributor's file or directory name. When a
//! candidate clashes with an unqualified name or with another contributor's
//! candidate, every clashing contributor escalates together, so the final
//! aliases depend only on the set of contributors and never on the order
//! they were seen in.
//!
//! Every binding is emitted in the type-only form exactly when its source is
//! type-only: named re-exports are split by form, and an alias uses
//! `export type * as` only when the aliased module exposes nothing but types.

use std::collections::{BTreeMap, BTreeSet};

use barrel_core::naming::alias_candidate;
use barrel_core::{
    AliasTarget, BarrelModule, BarrelShape, BindingForm, CollisionScope, Conflict, Contributor,
    ContributorOutcome, DemotionPolicy, FxHashMap, FxHashSet, ModuleAnalysis, QualifiedBinding,
    ReExportStatement, ResolutionStrategy, ResolveConfig,
};
use camino::{Utf8Path, Utf8PathBuf};

use crate::error::GenerateError;
use crate::registry::ScopeExports;

/// Escalation rounds before giving up on distinct aliases.
const MAX_ALIAS_ROUNDS: usize = 16;

/// What a contributor is backed by.
#[derive(Debug, Clone, Copy)]
pub enum ContributorSource<'a> {
    /// A direct source file.
    File(&'a ModuleAnalysis),
    /// A subdirectory's finalized barrel.
    Barrel(&'a BarrelShape),
}

impl ContributorSource<'_> {
    /// Returns `true` if everything the contributor exposes is type-only.
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        match self {
            Self::File(module) => module.is_type_only(),
            Self::Barrel(shape) => shape.is_type_only(),
        }
    }

    /// Returns `true` if the contributor defines `name`, qualified or not.
    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        match self {
            Self::File(module) => module.export(name).is_some(),
            Self::Barrel(shape) => {
                shape.unqualified.contains_key(name)
                    || shape.aliases.contains_key(name)
                    || shape.qualified.contains_key(name)
            }
        }
    }
}

/// Everything the resolver needs about one directory.
#[derive(Debug, Clone)]
pub struct DirectoryInput<'a> {
    /// The directory being resolved.
    pub directory: &'a Utf8Path,

    /// Names registered in the directory's scope.
    pub exports: Option<&'a ScopeExports>,

    /// Sources of the direct files and of the contributing subdirectories.
    pub sources: BTreeMap<Contributor, ContributorSource<'a>>,

    /// Barrel file name without extension (`index`).
    pub barrel_stem: &'a str,
}

impl DirectoryInput<'_> {
    fn source(&self, contributor: &Contributor) -> Result<ContributorSource<'_>, GenerateError> {
        self.sources.get(contributor).copied().ok_or_else(|| {
            GenerateError::structural(
                self.directory,
                format!("no analysis for {}", contributor.path),
            )
        })
    }
}

/// Output of resolving one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The barrel to emit.
    pub barrel: BarrelModule,

    /// What the barrel exposes.
    pub shape: BarrelShape,

    /// Every collision and how it was resolved.
    pub conflicts: Vec<Conflict>,
}

struct Decision<'a> {
    scope: CollisionScope,
    winner: Option<&'a Contributor>,
    aliased: Vec<&'a Contributor>,
    excluded: Vec<&'a Contributor>,
}

/// Applies the resolution policy to one directory at a time.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    config: &'c ResolveConfig,
}

impl<'c> Resolver<'c> {
    /// Creates a resolver for `config`.
    #[must_use]
    pub const fn new(config: &'c ResolveConfig) -> Self {
        Self { config }
    }

    /// Resolves every name of `input`'s scope.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Unresolved`] if a colliding name ends up with
    /// a contributor that received no strategy, and
    /// [`GenerateError::Structural`] if a registered contributor has no
    /// source.
    pub fn resolve(&self, input: &DirectoryInput<'_>) -> Result<Resolution, GenerateError> {
        let directory = input.directory;
        let mut unqualified: BTreeMap<&str, (&Contributor, BindingForm)> = BTreeMap::new();
        let mut aliased: BTreeMap<&Contributor, Vec<&str>> = BTreeMap::new();
        let mut decisions: Vec<(&str, Decision<'_>)> = Vec::new();

        for (name, contributors) in input.exports.into_iter().flat_map(ScopeExports::names) {
            if contributors.len() == 1 {
                if let Some((contributor, form)) = contributors.iter().next() {
                    unqualified.insert(name, (contributor, *form));
                }
                continue;
            }

            let decision = self.decide(input, contributors.keys().collect());
            if let Some(winner) = decision.winner {
                let form = contributors.get(winner).copied().unwrap_or(BindingForm::Value);
                unqualified.insert(name, (winner, form));
            }
            for &contributor in &decision.aliased {
                aliased.entry(contributor).or_default().push(name);
            }
            decisions.push((name, decision));
        }

        let default_forward = single_exporter(input);

        let mut reserved: FxHashSet<&str> = unqualified.keys().copied().collect();
        if default_forward.is_some() {
            reserved.insert("default");
        }
        let aliases = assign_aliases(aliased.keys().copied(), &reserved);

        let mut conflicts = Vec::with_capacity(decisions.len());
        for (name, decision) in &decisions {
            conflicts.push(record_conflict(input, name, decision, &aliases)?);
        }

        let mut barrel = BarrelModule::new(directory.to_owned());
        barrel.entries = shadowed_entries(input);
        let mut shape = BarrelShape::new(directory.to_owned());

        let mut by_target: BTreeMap<&Contributor, (Vec<String>, Vec<String>)> = BTreeMap::new();
        for (&name, &(contributor, form)) in &unqualified {
            let (values, types) = by_target.entry(contributor).or_default();
            match form {
                BindingForm::Value => values.push(name.to_owned()),
                BindingForm::TypeOnly => types.push(name.to_owned()),
            }
            shape.unqualified.insert(name.to_owned(), form);
        }
        for (contributor, (values, types)) in by_target {
            if !values.is_empty() {
                barrel
                    .statements
                    .push(ReExportStatement::named(contributor.clone(), values, false));
            }
            if !types.is_empty() {
                barrel
                    .statements
                    .push(ReExportStatement::named(contributor.clone(), types, true));
            }
        }

        for (contributor, alias) in &aliases {
            let type_only = input.source(contributor)?.is_type_only();
            barrel.statements.push(ReExportStatement::namespace(
                (*contributor).clone(),
                alias.clone(),
                type_only,
            ));
            shape.aliases.insert(
                alias.clone(),
                AliasTarget {
                    target: (*contributor).clone(),
                    form: if type_only {
                        BindingForm::TypeOnly
                    } else {
                        BindingForm::Value
                    },
                },
            );
            for name in aliased.get(contributor).into_iter().flatten() {
                let form = input
                    .exports
                    .and_then(|e| e.form_of(name, contributor))
                    .unwrap_or(BindingForm::Value);
                shape
                    .qualified
                    .entry((*name).to_owned())
                    .or_default()
                    .push(QualifiedBinding {
                        alias: alias.clone(),
                        module: barrel.target_path(contributor),
                        form,
                    });
            }
        }

        shape.has_default = default_forward.is_some();
        barrel.default_forward = default_forward;

        Ok(Resolution {
            barrel,
            shape,
            conflicts,
        })
    }

    fn decide<'a>(
        &self,
        input: &DirectoryInput<'_>,
        contributors: Vec<&'a Contributor>,
    ) -> Decision<'a> {
        let (files, dirs): (Vec<&Contributor>, Vec<&Contributor>) =
            contributors.into_iter().partition(|c| c.is_file());

        let mut decision = Decision {
            scope: CollisionScope::WithinDirectory,
            winner: None,
            aliased: Vec::new(),
            excluded: Vec::new(),
        };

        if files.is_empty() {
            decision.scope = CollisionScope::CrossSubdirectory;
            match self.unique_priority(input, &dirs) {
                Some(winner) => {
                    decision.winner = Some(winner);
                    for dir in dirs.into_iter().filter(|d| *d != winner) {
                        self.demote(&mut decision, dir);
                    }
                }
                None => decision.aliased = dirs,
            }
            return decision;
        }

        let winner = match files.as_slice() {
            [only] => Some(*only),
            _ => self.unique_priority(input, &files),
        };
        decision.winner = winner;
        decision
            .aliased
            .extend(files.into_iter().filter(|f| Some(*f) != winner));

        if !dirs.is_empty() {
            decision.scope = CollisionScope::RootVsSubdirectory;
            for dir in dirs {
                self.demote(&mut decision, dir);
            }
        }
        decision
    }

    fn demote<'a>(&self, decision: &mut Decision<'a>, contributor: &'a Contributor) {
        match self.config.demotion {
            DemotionPolicy::Alias => decision.aliased.push(contributor),
            DemotionPolicy::Exclude => decision.excluded.push(contributor),
        }
    }

    /// The one contributor matching a priority rule, if exactly one does.
    fn unique_priority<'a>(
        &self,
        input: &DirectoryInput<'_>,
        candidates: &[&'a Contributor],
    ) -> Option<&'a Contributor> {
        let mut matching = candidates.iter().copied().filter(|c| {
            self.config.is_priority(c.name(), |name| {
                input.sources.get(*c).is_some_and(|s| s.defines(name))
            })
        });
        let first = matching.next()?;
        matching.next().is_none().then_some(first)
    }
}

/// Barrel entry paths for subdirectories whose bare specifier a sibling
/// file (`games.ts` next to `games/`) would capture.
fn shadowed_entries(input: &DirectoryInput<'_>) -> BTreeMap<Utf8PathBuf, Utf8PathBuf> {
    let files: BTreeSet<Utf8PathBuf> = input
        .sources
        .keys()
        .filter(|c| c.is_file())
        .map(Contributor::module_path)
        .collect();
    input
        .sources
        .keys()
        .filter(|c| !c.is_file() && files.contains(c.path()))
        .map(|c| (c.path.clone(), c.path.join(input.barrel_stem)))
        .collect()
}

/// The file whose default export the barrel forwards, if the directory has
/// exactly one exporting file and no contributing subdirectory.
fn single_exporter(input: &DirectoryInput<'_>) -> Option<Contributor> {
    let mut exporting = Vec::new();
    for (contributor, source) in &input.sources {
        match source {
            ContributorSource::Barrel(shape) if !shape.is_empty() => return None,
            ContributorSource::File(module) if module.has_exports() => {
                exporting.push((contributor, *module));
            }
            _ => {}
        }
    }
    match exporting.as_slice() {
        [(contributor, module)] => module.value_default().map(|_| (*contributor).clone()),
        _ => None,
    }
}

fn alias_at(contributor: &Contributor, level: usize) -> String {
    if level < 2 {
        alias_candidate(contributor.name(), level)
    } else {
        alias_candidate(contributor.file_name(), level)
    }
}

/// Assigns pairwise distinct aliases that avoid `reserved`.
fn assign_aliases<'a>(
    contributors: impl Iterator<Item = &'a Contributor>,
    reserved: &FxHashSet<&str>,
) -> BTreeMap<&'a Contributor, String> {
    let mut levels: BTreeMap<&Contributor, usize> = contributors.map(|c| (c, 0)).collect();
    let mut candidates = BTreeMap::new();

    for _ in 0..MAX_ALIAS_ROUNDS {
        candidates = levels
            .iter()
            .map(|(contributor, level)| (*contributor, alias_at(contributor, *level)))
            .collect::<BTreeMap<_, _>>();

        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for alias in candidates.values() {
            *counts.entry(alias.as_str()).or_default() += 1;
        }
        let clashing: BTreeSet<&Contributor> = candidates
            .iter()
            .filter(|(_, alias)| {
                reserved.contains(alias.as_str()) || counts.get(alias.as_str()) > Some(&1)
            })
            .map(|(contributor, _)| *contributor)
            .collect();

        if clashing.is_empty() {
            break;
        }
        for contributor in clashing {
            if let Some(level) = levels.get_mut(contributor) {
                *level += 1;
            }
        }
    }
    candidates
}

fn record_conflict(
    input: &DirectoryInput<'_>,
    name: &str,
    decision: &Decision<'_>,
    aliases: &BTreeMap<&Contributor, String>,
) -> Result<Conflict, GenerateError> {
    let contributors = input
        .exports
        .and_then(|e| e.contributors_of(name))
        .ok_or_else(|| GenerateError::unresolved(input.directory, name))?;

    let mut outcomes = Vec::with_capacity(contributors.len());
    let mut winner_strategy = None;
    for (contributor, form) in contributors {
        let outcome = if decision.winner == Some(contributor) {
            let strategy = match form {
                BindingForm::Value => ResolutionStrategy::Direct,
                BindingForm::TypeOnly => ResolutionStrategy::TypeOnlyDirect,
            };
            winner_strategy = Some(strategy);
            ContributorOutcome {
                contributor: contributor.clone(),
                strategy,
                alias: None,
            }
        } else if decision.aliased.contains(&contributor) {
            ContributorOutcome {
                contributor: contributor.clone(),
                strategy: ResolutionStrategy::QualifiedAlias,
                alias: aliases.get(contributor).cloned(),
            }
        } else if decision.excluded.contains(&contributor) {
            ContributorOutcome {
                contributor: contributor.clone(),
                strategy: ResolutionStrategy::Excluded,
                alias: None,
            }
        } else {
            return Err(GenerateError::unresolved(input.directory, name));
        };
        outcomes.push(outcome);
    }

    let strategy = winner_strategy.unwrap_or(if decision.aliased.is_empty() {
        ResolutionStrategy::Excluded
    } else {
        ResolutionStrategy::QualifiedAlias
    });

    Ok(Conflict {
        directory: input.directory.to_owned(),
        name: name.to_owned(),
        scope: decision.scope,
        contributors: outcomes,
        strategy,
        resolved: true,
    })
}

#[cfg(test)]
mod tests {
    use barrel_core::{ExportDeclaration, ExportKind, PriorityRule};

    use super::*;
    use crate::registry::ExportRegistry;

    fn module(path: &str, exports: &[(&str, ExportKind)]) -> ModuleAnalysis {
        let mut analysis = ModuleAnalysis::new(path.into(), 0);
        for (name, kind) in exports {
            analysis
                .exports
                .push(ExportDeclaration::new(*name, *kind, path, 1));
        }
        analysis
    }

    fn resolve_with(
        config: &ResolveConfig,
        dir: &str,
        modules: &[ModuleAnalysis],
        shapes: &[BarrelShape],
    ) -> Resolution {
        let mut registry = ExportRegistry::from_modules(modules);
        for shape in shapes {
            registry.register_barrel(shape);
        }
        let mut sources = BTreeMap::new();
        for module in modules {
            sources.insert(Contributor::file(module.path.clone()), ContributorSource::File(module));
        }
        for shape in shapes {
            sources.insert(
                Contributor::directory(shape.directory.clone()),
                ContributorSource::Barrel(shape),
            );
        }
        let input = DirectoryInput {
            directory: Utf8Path::new(dir),
            exports: registry.scope(Utf8Path::new(dir)),
            sources,
            barrel_stem: "index",
        };
        Resolver::new(config).resolve(&input).expect("resolution")
    }

    fn resolve(dir: &str, modules: &[ModuleAnalysis], shapes: &[BarrelShape]) -> Resolution {
        resolve_with(&ResolveConfig::default(), dir, modules, shapes)
    }

    fn shape(dir: &str, names: &[(&str, BindingForm)]) -> BarrelShape {
        let mut shape = BarrelShape::new(dir.into());
        for (name, form) in names {
            shape.unqualified.insert((*name).to_owned(), *form);
        }
        shape
    }

    #[test]
    fn test_shadowed_subdirectory_is_imported_through_its_barrel() {
        let resolution = resolve(
            "/src",
            &[module("/src/games.ts", &[("Game", ExportKind::Named)])],
            &[shape(
                "/src/games",
                &[("Game", BindingForm::Value), ("listGames", BindingForm::Value)],
            )],
        );

        let barrel = resolution.barrel.render();
        assert!(barrel.contains("export { Game } from './games';"));
        assert!(barrel.contains("export { listGames } from './games/index';"));
        assert!(barrel.contains("export * as games from './games/index';"));
        assert_eq!(
            resolution.shape.qualified["Game"][0].module,
            Utf8PathBuf::from("/src/games/index")
        );
    }

    #[test]
    fn test_sibling_collision_aliases_both_files() {
        let resolution = resolve(
            "/src/api",
            &[
                module(
                    "/src/api/gamesService.ts",
                    &[("ApiResponse", ExportKind::TypeOnly), ("getGames", ExportKind::Named)],
                ),
                module(
                    "/src/api/historicGamesService.ts",
                    &[("ApiResponse", ExportKind::TypeOnly), ("getHistoric", ExportKind::Named)],
                ),
            ],
            &[],
        );

        insta::assert_snapshot!(resolution.barrel.render(), @r"
        // @generated by barrelgen. Do not edit.
        export { getGames } from './gamesService';
        export * as gamesService from './gamesService';
        export { getHistoric } from './historicGamesService';
        export * as historicGamesService from './historicGamesService';
        ");
        assert_eq!(resolution.conflicts.len(), 1);
        let conflict = &resolution.conflicts[0];
        assert_eq!(conflict.scope, CollisionScope::WithinDirectory);
        assert_eq!(conflict.strategy, ResolutionStrategy::QualifiedAlias);
        assert!(conflict.winner().is_none());
        assert_eq!(resolution.shape.qualified["ApiResponse"].len(), 2);
    }

    #[test]
    fn test_priority_file_keeps_name() {
        let config = ResolveConfig {
            priority: vec![PriorityRule::new("common").expect_declarations(["ApiResponse"])],
            ..ResolveConfig::default()
        };
        let resolution = resolve_with(
            &config,
            "/src/api",
            &[
                module("/src/api/common.ts", &[("ApiResponse", ExportKind::TypeOnly)]),
                module("/src/api/games.ts", &[("ApiResponse", ExportKind::TypeOnly)]),
            ],
            &[],
        );

        let conflict = &resolution.conflicts[0];
        let winner = conflict.winner().expect("priority winner");
        assert_eq!(winner.contributor.name(), "common");
        assert_eq!(winner.strategy, ResolutionStrategy::TypeOnlyDirect);
        assert_eq!(
            resolution.shape.unqualified.get("ApiResponse"),
            Some(&BindingForm::TypeOnly)
        );
        assert!(resolution.shape.aliases.contains_key("games"));
        assert_eq!(resolution.barrel.duplicate_binding(), None);
    }

    #[test]
    fn test_root_file_beats_subdirectory() {
        let resolution = resolve(
            "/src",
            &[module("/src/config.ts", &[("Config", ExportKind::Named)])],
            &[shape(
                "/src/settings",
                &[("Config", BindingForm::Value), ("Theme", BindingForm::TypeOnly)],
            )],
        );

        insta::assert_snapshot!(resolution.barrel.render(), @r"
        // @generated by barrelgen. Do not edit.
        export { Config } from './config';
        export type { Theme } from './settings';
        export * as settings from './settings';
        ");
        let conflict = &resolution.conflicts[0];
        assert_eq!(conflict.scope, CollisionScope::RootVsSubdirectory);
        assert!(conflict.winner().expect("winner").contributor.is_file());
    }

    #[test]
    fn test_exclude_policy_drops_subdirectory_binding() {
        let config = ResolveConfig {
            demotion: DemotionPolicy::Exclude,
            ..ResolveConfig::default()
        };
        let resolution = resolve_with(
            &config,
            "/src",
            &[module("/src/config.ts", &[("Config", ExportKind::Named)])],
            &[shape("/src/settings", &[("Config", BindingForm::Value)])],
        );

        assert!(resolution.shape.aliases.is_empty());
        assert_eq!(
            resolution.conflicts[0].contributors[1].strategy,
            ResolutionStrategy::Excluded
        );
    }

    #[test]
    fn test_cross_subdirectory_without_priority_drops_unqualified_name() {
        let resolution = resolve(
            "/src",
            &[],
            &[
                shape("/src/games", &[("Game", BindingForm::TypeOnly)]),
                shape("/src/legacy", &[("Game", BindingForm::TypeOnly)]),
            ],
        );

        assert!(!resolution.shape.unqualified.contains_key("Game"));
        insta::assert_snapshot!(resolution.barrel.render(), @r"
        // @generated by barrelgen. Do not edit.
        export type * as games from './games';
        export type * as legacy from './legacy';
        ");
    }

    #[test]
    fn test_priority_subdirectory_needs_expected_declarations() {
        let config = ResolveConfig {
            priority: vec![PriorityRule::new("models").expect_declarations(["Game", "User"])],
            ..ResolveConfig::default()
        };
        let models = shape(
            "/src/models",
            &[("Game", BindingForm::TypeOnly), ("User", BindingForm::TypeOnly)],
        );
        let legacy = shape("/src/legacy", &[("Game", BindingForm::TypeOnly)]);

        let resolution = resolve_with(&config, "/src", &[], &[models, legacy]);
        let winner = resolution.conflicts[0].winner().expect("winner");
        assert_eq!(winner.contributor.name(), "models");

        let lacking = shape("/src/models", &[("Game", BindingForm::TypeOnly)]);
        let legacy = shape("/src/legacy", &[("Game", BindingForm::TypeOnly)]);
        let resolution = resolve_with(&config, "/src", &[], &[lacking, legacy]);
        assert!(resolution.conflicts[0].winner().is_none());
    }

    #[test]
    fn test_alias_clash_with_unqualified_name_escalates() {
        let resolution = resolve(
            "/src",
            &[
                module("/src/games.ts", &[("Game", ExportKind::Named)]),
                module("/src/other.ts", &[("Game", ExportKind::Named), ("games", ExportKind::Named)]),
            ],
            &[],
        );

        let aliases: Vec<&str> = resolution.shape.aliases.keys().map(String::as_str).collect();
        assert_eq!(aliases, ["gamesNs", "other"]);
        assert_eq!(resolution.barrel.duplicate_binding(), None);
    }

    #[test]
    fn test_single_exporter_forwards_value_default() {
        let resolution = resolve(
            "/src/games",
            &[module(
                "/src/games/gamesService.ts",
                &[("default", ExportKind::Default), ("fetchGames", ExportKind::Named)],
            )],
            &[],
        );

        insta::assert_snapshot!(resolution.barrel.render(), @r"
        // @generated by barrelgen. Do not edit.
        export { default } from './gamesService';
        export { fetchGames } from './gamesService';
        ");
        assert!(resolution.shape.has_default);
    }

    #[test]
    fn test_type_backed_default_is_never_forwarded() {
        let resolution = resolve(
            "/src/dto",
            &[module(
                "/src/dto/game.ts",
                &[("default", ExportKind::TypeOnly), ("Game", ExportKind::TypeOnly)],
            )],
            &[],
        );

        assert!(resolution.barrel.default_forward.is_none());
        assert!(resolution.shape.is_type_only());
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let a = module("/src/a.ts", &[("X", ExportKind::Named)]);
        let b = module("/src/b.ts", &[("X", ExportKind::Named)]);
        let forward = resolve("/src", &[a.clone(), b.clone()], &[]);
        let backward = resolve("/src", &[b, a], &[]);
        assert_eq!(forward, backward);
    }
}
