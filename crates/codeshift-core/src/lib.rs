//! Core infrastructure for codeshift.
//!
//! This crate provides the language-agnostic pieces shared by the pipeline:
//! - Error types and exit codes
//! - The [`Tracer`](tracer::Tracer) reporting boundary
//! - Ignore-path and output-path resolution
//! - Text position utilities

pub mod error;
pub mod paths;
pub mod text;
pub mod tracer;
