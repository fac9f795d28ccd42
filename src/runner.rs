//! Orchestrates an ordered schedule of codemods over one target.
//!
//! Each scheduled codemod gets a fresh [`Transformer`]. When an output
//! location is requested, the first codemod writes there and every later one
//! runs in place on that output; otherwise every codemod rewrites the target
//! in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use codeshift_core::error::ShiftResult;
use codeshift_core::paths::IgnoreSet;
use codeshift_core::tracer::Tracer;
use codeshift_syntax::SourceToolkit;
use tracing::{debug, info};

use crate::codemod::PreparedCodemod;
use crate::registry::CodemodRegistry;
use crate::transformer::Transformer;

pub use codeshift_core::paths::resolve_relative_paths;

/// Runs scheduled codemods in order, chaining their outputs.
pub struct Runner {
    registry: CodemodRegistry,
    toolkit: Arc<dyn SourceToolkit>,
    tracer: Arc<dyn Tracer>,
    schedule: Vec<PathBuf>,
}

impl Runner {
    pub fn new(
        registry: CodemodRegistry,
        toolkit: Arc<dyn SourceToolkit>,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        Self {
            registry,
            toolkit,
            tracer,
            schedule: Vec::new(),
        }
    }

    pub fn registry(&self) -> &CodemodRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CodemodRegistry {
        &mut self.registry
    }

    pub fn tracer(&self) -> &Arc<dyn Tracer> {
        &self.tracer
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    /// Append a codemod manifest. Nothing is checked until it is loaded.
    pub fn add_codemod(&mut self, path: impl Into<PathBuf>) {
        self.schedule.push(path.into());
    }

    pub fn add_codemods<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.schedule.extend(paths.into_iter().map(Into::into));
    }

    pub fn clear_codemods(&mut self) {
        self.schedule.clear();
    }

    /// Scheduled manifest paths, in execution order.
    pub fn schedule(&self) -> &[PathBuf] {
        &self.schedule
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load the manifest at `path`, run setup, and return a transformer
    /// prepared with the resulting codemod.
    pub fn load_codemod(&self, path: &Path) -> ShiftResult<Transformer> {
        let (name, codemod) = self.registry.load(path, self.tracer.clone())?;
        let prepared = PreparedCodemod::new(name, path, codemod)?;
        debug!(
            codemod = prepared.name(),
            steps = prepared.traversal_count(),
            "prepared codemod"
        );
        self.tracer.trace_codemod_loaded(prepared.name(), path);
        Ok(Transformer::new(self.toolkit.clone(), self.tracer.clone()).with_codemod(prepared))
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run every scheduled codemod over `target` and return the final
    /// artifact path.
    ///
    /// `ignore` entries starting with `./` are resolved against `target`.
    pub fn execute<P: AsRef<Path>>(
        &self,
        target: &Path,
        output: Option<&Path>,
        ignore: &[P],
    ) -> ShiftResult<PathBuf> {
        let ignore = IgnoreSet::from_paths(resolve_relative_paths(ignore, target));
        let mut current = target.to_path_buf();
        let mut output = output.map(Path::to_path_buf);

        for manifest in &self.schedule {
            let mut transformer = self.load_codemod(manifest)?;
            info!(
                codemod = %manifest.display(),
                target = %current.display(),
                "running codemod"
            );
            let produced = transformer.run_on_path(&current, output.as_deref(), &ignore)?;
            // later codemods continue in place on what this one produced
            if output.take().is_some() {
                current = produced;
            }
        }

        Ok(current)
    }

    /// Like [`execute`](Self::execute), but report any failure through the
    /// tracer instead of returning it.
    ///
    /// Returns whether the whole schedule succeeded.
    pub fn execute_secured<P: AsRef<Path>>(
        &self,
        target: &Path,
        output: Option<&Path>,
        ignore: &[P],
        with_stack: bool,
    ) -> bool {
        match self.execute(target, output, ignore) {
            Ok(_) => true,
            Err(err) => {
                self.tracer.trace_exception(&err, with_stack);
                false
            }
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("toolkit", &self.toolkit.name())
            .field("schedule", &self.schedule)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
