//! codeshift: a codemod pipeline for PHP sources.
//!
//! Applies user-defined source-to-source transformations across a file or a
//! directory tree, keeping the original formatting of every region a codemod
//! did not touch.
//!
//! - [`codemod`]: the codemod lifecycle (setup, before, traversal steps, after)
//! - [`registry`]: TOML manifests and the named factories they select
//! - [`transformer`]: one codemod over text, a file, or a directory
//! - [`runner`]: an ordered schedule of codemods, chaining outputs

// Core infrastructure - re-exported from the workspace crates
pub use codeshift_core::{error, paths, text, tracer};
pub use codeshift_syntax as syntax;

pub mod codemod;
pub mod codemods;
pub mod registry;
pub mod runner;
pub mod transformer;

// Front door
pub mod cli;

pub use codemod::{Codemod, PreparedCodemod, TransformContext, TraversalPlan};
pub use registry::{CodemodInit, CodemodManifest, CodemodRegistry};
pub use runner::Runner;
pub use transformer::Transformer;
