//! Runs one prepared codemod over text, a file, or a directory tree.
//!
//! Every file goes through the same cycle:
//!
//! 1. parse into the original tree and its token stream
//! 2. deep-clone the working tree
//! 3. run the codemod's phases on the working tree
//! 4. re-print with the format-preserving printer
//!
//! Without a codemod the clone is printed unchanged, which reproduces the
//! input byte for byte.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codeshift_core::error::{ShiftError, ShiftResult};
use codeshift_core::paths::{
    has_extension, normalize_path, resolve_output_dir, resolve_output_file, IgnoreSet,
};
use codeshift_core::tracer::Tracer;
use codeshift_syntax::SourceToolkit;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::codemod::{PreparedCodemod, TransformContext};

/// Applies at most one codemod to sources, reporting through a [`Tracer`].
pub struct Transformer {
    toolkit: Arc<dyn SourceToolkit>,
    tracer: Arc<dyn Tracer>,
    codemod: Option<PreparedCodemod>,
    extensions: Option<Vec<String>>,
}

impl Transformer {
    /// A transformer with no codemod: every file round-trips unchanged.
    pub fn new(toolkit: Arc<dyn SourceToolkit>, tracer: Arc<dyn Tracer>) -> Self {
        Self {
            toolkit,
            tracer,
            codemod: None,
            extensions: None,
        }
    }

    pub fn with_codemod(mut self, codemod: PreparedCodemod) -> Self {
        self.codemod = Some(codemod);
        self
    }

    /// Override the extensions recognized during a directory walk.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn set_codemod(&mut self, codemod: Option<PreparedCodemod>) {
        self.codemod = codemod;
    }

    pub fn codemod(&self) -> Option<&PreparedCodemod> {
        self.codemod.as_ref()
    }

    pub fn tracer(&self) -> &Arc<dyn Tracer> {
        &self.tracer
    }

    /// Extensions (without the dot) a directory walk processes.
    pub fn extensions(&self) -> Vec<&str> {
        match &self.extensions {
            Some(overrides) => overrides.iter().map(String::as_str).collect(),
            None => self.toolkit.file_extensions().to_vec(),
        }
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Transform source text.
    ///
    /// `context` is visible to the codemod for this call only.
    pub fn run_on_text(
        &mut self,
        text: &str,
        context: Option<TransformContext>,
    ) -> ShiftResult<String> {
        let file = context.as_ref().and_then(TransformContext::input_file);
        let parsed = self.toolkit.parse(text).map_err(|e| ShiftError::Parse {
            file: file.clone(),
            message: e.message,
            line: e.line,
            column: e.column,
        })?;

        let mut working = self.toolkit.clone_tree(&parsed.tree);
        if let Some(codemod) = self.codemod.as_mut() {
            codemod.set_context(context);
            let result = codemod.transform(working);
            codemod.set_context(None);
            working = result.map_err(|source| ShiftError::CodemodFailed { file, source })?;
        }

        Ok(self
            .toolkit
            .print_preserving_format(&parsed.tree, &parsed.tokens, &working))
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Transform one file and return the absolute output path.
    ///
    /// `output` follows [`resolve_output_file`]; `None` rewrites in place.
    pub fn run_on_file(&mut self, input: &Path, output: Option<&Path>) -> ShiftResult<PathBuf> {
        if !input.is_file() {
            return Err(ShiftError::file_not_found(input));
        }
        let input = normalize_path(input);
        let target = resolve_output_file(&input, output).map_err(|e| ShiftError::io(&input, e))?;

        let text = fs::read_to_string(&input).map_err(|e| ShiftError::io(&input, e))?;
        let context = TransformContext::for_file(&input, &target);
        let result = self.run_on_text(&text, Some(context))?;
        let changed = result != text;

        if changed || target != input {
            fs::write(&target, &result).map_err(|e| ShiftError::io(&target, e))?;
        }
        debug!(input = %input.display(), output = %target.display(), changed, "transformed file");
        self.tracer.trace_file_transformation(&input, &target, changed);
        Ok(target)
    }

    // ========================================================================
    // Directories
    // ========================================================================

    /// Transform every recognized file under `input`, mirroring the layout
    /// into `output` (in place when `None`). Returns the output directory.
    ///
    /// Entries in `ignore`, and the output directory itself, are skipped
    /// along with their subtrees.
    pub fn run_on_directory(
        &mut self,
        input: &Path,
        output: Option<&Path>,
        ignore: &IgnoreSet,
    ) -> ShiftResult<PathBuf> {
        if !input.is_dir() {
            return Err(ShiftError::file_not_found(input));
        }
        let root = normalize_path(input);
        let out_root = resolve_output_dir(&root, output, self.tracer.as_ref())
            .map_err(|e| ShiftError::io(output.unwrap_or(root.as_path()), e))?;

        let mut ignore = ignore.clone();
        if out_root != root {
            ignore.insert(&out_root);
        }

        let extensions: Vec<String> = self.extensions().into_iter().map(str::to_string).collect();
        let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
        let mut processed = 0usize;

        for entry in WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let skip = ignore.contains(e.path());
                if skip {
                    debug!(path = %e.path().display(), "ignored");
                }
                !skip
            })
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                ShiftError::io(&path, e.into())
            })?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), &extensions) {
                continue;
            }

            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            let target = out_root.join(relative);
            self.run_on_file(entry.path(), Some(target.as_path()))?;
            processed += 1;
        }

        info!(
            input = %root.display(),
            output = %out_root.display(),
            files = processed,
            "transformed directory"
        );
        Ok(out_root)
    }

    /// Dispatch to [`run_on_file`](Self::run_on_file) or
    /// [`run_on_directory`](Self::run_on_directory).
    pub fn run_on_path(
        &mut self,
        path: &Path,
        output: Option<&Path>,
        ignore: &IgnoreSet,
    ) -> ShiftResult<PathBuf> {
        if path.is_dir() {
            self.run_on_directory(path, output, ignore)
        } else if path.is_file() {
            self.run_on_file(path, output)
        } else {
            Err(ShiftError::file_not_found(path))
        }
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("toolkit", &self.toolkit.name())
            .field("codemod", &self.codemod)
            .field("extensions", &self.extensions())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
