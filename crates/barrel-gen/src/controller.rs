//! Bounded fixed-point iteration over scan, heal and generate.
//!
//! Each pass:
//!
//! 1. Discovers the tree and analyzes files whose content hash changed.
//! 2. Heals type-only defaults and imports made stale by the previous pass's
//!    barrels. Rewritten files are re-analyzed before step 3.
//! 3. Rebuilds the registry, then resolves and emits every barrel bottom-up.
//!
//! Another pass follows while a file was rewritten or a barrel changed, up
//! to [`HealConfig::max_passes`](barrel_core::HealConfig::max_passes).

use std::collections::BTreeMap;

use barrel_core::{BarrelShape, Config};
use barrel_scanner::{AnalysisCache, Scanner};
use camino::Utf8PathBuf;
use tracing::{error, info, warn};

use crate::error::GenerateError;
use crate::generator::BarrelGenerator;
use crate::heal::Healer;
use crate::report::RunReport;

/// Drives passes until the tree converges or the pass limit is reached.
#[derive(Debug, Clone, Copy)]
pub struct PassController<'c> {
    config: &'c Config,
    dry_run: bool,
}

impl<'c> PassController<'c> {
    /// Creates a controller. The config is expected to be validated.
    #[must_use]
    pub const fn new(config: &'c Config, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    /// Maximum passes for this run. A dry run never gets past the first.
    #[must_use]
    pub fn max_passes(&self) -> usize {
        if self.dry_run {
            1
        } else {
            self.config.heal.max_passes.max(1)
        }
    }

    /// Runs the pipeline.
    ///
    /// Only a failing scan is returned as `Err`; errors inside a pass are
    /// collected in the report, and a fatal one ends the run early.
    pub fn run(&self) -> Result<RunReport, GenerateError> {
        let scanner = Scanner::new(&self.config.generate)?;
        let cache = AnalysisCache::new();
        let generator = BarrelGenerator::new(self.config, self.dry_run);
        let healer = Healer::new(
            &self.config.heal,
            &self.config.generate.barrel_file_name,
            self.dry_run,
        );

        let max_passes = self.max_passes();
        let mut report = RunReport::new(self.dry_run);
        let mut previous: BTreeMap<Utf8PathBuf, BarrelShape> = BTreeMap::new();

        for pass in 1..=max_passes {
            info!(pass, root = %scanner.root(), "Starting pass");

            let mut scan = scanner.scan(&cache)?;
            let healed = healer.heal(&scan, &previous, &cache);
            let dirty = healed.is_dirty();
            if dirty {
                info!(pass, count = healed.rewritten.len(), "Re-analyzing healed files");
                scan = scanner.scan(&cache)?;
            }

            let outcome = generator.run_pass(&scan);
            let changed = outcome.changed();
            let fatal = outcome.has_fatal();
            previous = outcome.shapes.clone();

            report.record_pass(scan.modules.len(), healed, outcome);
            report.extend_warnings(scan.warnings);

            if fatal {
                error!(pass, "Pass failed, stopping");
                return Ok(report);
            }
            if !dirty && !changed {
                report.converged = true;
                info!(pass, "Converged");
                return Ok(report);
            }
        }

        if !self.dry_run {
            warn!(max_passes, "Pass limit reached before convergence");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_is_single_pass() {
        let mut config = Config::default();
        config.heal.max_passes = 4;
        assert_eq!(PassController::new(&config, true).max_passes(), 1);
        assert_eq!(PassController::new(&config, false).max_passes(), 4);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let mut config = Config::default();
        config.generate.root_path = "/definitely/not/here/barrelgen".into();
        let err = PassController::new(&config, false)
            .run()
            .expect_err("missing root");
        assert!(err.is_fatal());
    }
}
