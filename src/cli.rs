//! Command implementations behind the `codeshift` binary.
//!
//! These take plain option structs so they can be exercised without going
//! through argument parsing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codeshift_core::error::{ShiftError, ShiftResult};
use codeshift_core::tracer::Tracer;
use codeshift_syntax::{PhpToolkit, SourceToolkit};

use crate::registry::CodemodRegistry;
use crate::runner::Runner;

/// Options for `codeshift run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Codemod manifests, in execution order.
    pub codemods: Vec<PathBuf>,
    /// File or directory to transform.
    pub target: PathBuf,
    /// Redirect output here instead of rewriting in place.
    pub output: Option<PathBuf>,
    /// Paths excluded from a directory run.
    pub ignore: Vec<String>,
    /// Include the full cause chain when reporting a failure.
    pub stack: bool,
}

/// Run the scheduled codemods and return the final artifact path.
///
/// A failure is reported through `tracer` before it is returned, so the
/// caller only needs it for the exit code.
pub fn run_codemods(options: &RunOptions, tracer: Arc<dyn Tracer>) -> ShiftResult<PathBuf> {
    let result = execute_run(options, tracer.clone());
    if let Err(err) = &result {
        tracer.trace_exception(err, options.stack);
    }
    result
}

fn execute_run(options: &RunOptions, tracer: Arc<dyn Tracer>) -> ShiftResult<PathBuf> {
    if options.codemods.is_empty() {
        return Err(ShiftError::invalid_arguments("at least one codemod is required"));
    }
    let mut runner = Runner::new(
        CodemodRegistry::builtin(),
        Arc::new(PhpToolkit::new()),
        tracer,
    );
    runner.add_codemods(options.codemods.iter().cloned());
    runner.execute(&options.target, options.output.as_deref(), &options.ignore)
}

/// Output format for `codeshift ast`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AstFormat {
    /// Indented, human-readable tree.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Parse `file` and render its tree.
pub fn dump_ast(file: &Path, format: AstFormat) -> ShiftResult<String> {
    if !file.is_file() {
        return Err(ShiftError::file_not_found(file));
    }
    let text = fs::read_to_string(file).map_err(|e| ShiftError::io(file, e))?;
    let parsed = PhpToolkit::new().parse(&text).map_err(|e| ShiftError::Parse {
        file: Some(file.to_path_buf()),
        message: e.message,
        line: e.line,
        column: e.column,
    })?;
    match format {
        AstFormat::Text => Ok(parsed.tree.dump()),
        AstFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&parsed.tree).map_err(|e| ShiftError::io(file, e.into()))?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write `content` to `output`, or to the tracer when no output is given.
pub fn emit(content: &str, output: Option<&Path>, tracer: &dyn Tracer) -> ShiftResult<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| ShiftError::io(parent, e))?;
            }
            fs::write(path, content).map_err(|e| ShiftError::io(path, e))
        }
        None => {
            tracer.write_line(content.trim_end_matches('\n'));
            Ok(())
        }
    }
}

/// Names of the built-in codemods, sorted.
pub fn list_codemods() -> Vec<String> {
    CodemodRegistry::builtin()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_core::tracer::MemoryTracer;
    use tempfile::TempDir;

    #[test]
    fn run_without_codemods_is_invalid() {
        let tracer = Arc::new(MemoryTracer::new());
        let err = run_codemods(&RunOptions::default(), tracer.clone()).unwrap_err();
        assert!(matches!(err, ShiftError::InvalidArguments { .. }));
        assert_eq!(
            tracer.error_lines(),
            vec!["error: invalid arguments: at least one codemod is required"]
        );
    }

    #[test]
    fn ast_dump_in_both_formats() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.php");
        fs::write(&file, "<?php echo 1;\n").unwrap();

        let text = dump_ast(&file, AstFormat::Text).unwrap();
        assert!(text.lines().next().unwrap().starts_with("php_tag"));
        assert!(text.contains("echo_statement"));

        let json = dump_ast(&file, AstFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["statements"][1]["kind"], "echo_statement");
    }

    #[test]
    fn ast_of_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            dump_ast(&temp.path().join("nope.php"), AstFormat::Text),
            Err(ShiftError::FileNotFound { .. })
        ));
    }

    #[test]
    fn emit_writes_file_or_tracer() {
        let temp = TempDir::new().unwrap();
        let tracer = MemoryTracer::new();
        let out = temp.path().join("nested/ast.txt");

        emit("tree\n", Some(out.as_path()), &tracer).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "tree\n");

        emit("tree\n", None, &tracer).unwrap();
        assert_eq!(tracer.lines(), vec!["tree"]);
    }

    #[test]
    fn lists_builtin_codemods() {
        assert_eq!(
            list_codemods(),
            vec!["identity", "rename-function", "replace-string-literals"]
        );
    }
}
