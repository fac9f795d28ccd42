// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source toolkit for codeshift.
//!
//! This crate is the narrow interface between the codemod pipeline and the
//! concrete source language:
//!
//! - [`SourceTree`] / [`Node`]: a generic tree of statement-level nodes, each
//!   carrying an identity marker and its byte span in the original text
//! - [`parse_php`]: builds a tree and token stream with tree-sitter-php
//! - [`print_preserving_format`]: re-emits text from an original/new tree pair,
//!   reusing original text for every node that did not change
//! - [`visitor`]: full-tree traversal with enter/leave hooks
//! - [`SourceToolkit`]: the trait the pipeline consumes
//!
//! # Example
//!
//! ```ignore
//! use codeshift_syntax::{parse_php, print_preserving_format};
//!
//! let parsed = parse_php("<?php\nfunction greet() {}\n")?;
//! let mut working = parsed.tree.clone();
//! if let Some(name) = working
//!     .find_first_mut("function_definition")
//!     .and_then(|f| f.child_by_field_mut("name"))
//! {
//!     name.set_text("hello");
//! }
//! let text = print_preserving_format(&parsed.tree, &parsed.tokens, &working);
//! assert_eq!(text, "<?php\nfunction hello() {}\n");
//! ```

mod dump;
mod parser;
mod printer;
mod toolkit;
mod tree;
pub mod visitor;

pub use parser::{parse_php, ParseError};
pub use printer::print_preserving_format;
pub use toolkit::{PhpToolkit, SourceToolkit, PHP_EXTENSIONS};
pub use tree::{Node, NodeId, ParsedSource, SourceTree, Span, Token, TokenStream};
