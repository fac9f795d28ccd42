// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The toolkit interface consumed by the codemod pipeline.

use crate::parser::{parse_php, ParseError};
use crate::printer::print_preserving_format;
use crate::tree::{ParsedSource, SourceTree, TokenStream};

/// Extensions recognized as PHP sources during a directory walk.
pub const PHP_EXTENSIONS: &[&str] = &["php", "php3", "php4", "php5", "php7", "phtml"];

/// Parse, clone and format-preserving print for one source language.
///
/// Implementations must be shareable across threads; the pipeline holds them
/// behind an `Arc`.
pub trait SourceToolkit: Send + Sync {
    /// Short language name, used in diagnostics.
    fn name(&self) -> &str;

    /// Parse text into the original tree and its token stream.
    fn parse(&self, text: &str) -> Result<ParsedSource, ParseError>;

    /// Deep, alias-free copy that keeps every identity marker.
    fn clone_tree(&self, tree: &SourceTree) -> SourceTree {
        tree.clone()
    }

    /// Re-emit `new`, reusing original text for unchanged nodes.
    fn print_preserving_format(
        &self,
        original: &SourceTree,
        tokens: &TokenStream,
        new: &SourceTree,
    ) -> String {
        print_preserving_format(original, tokens, new)
    }

    /// File extensions (without the dot) this toolkit handles.
    fn file_extensions(&self) -> &[&str];
}

/// The PHP toolkit, backed by tree-sitter-php.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpToolkit;

impl PhpToolkit {
    pub fn new() -> Self {
        Self
    }
}

impl SourceToolkit for PhpToolkit {
    fn name(&self) -> &str {
        "php"
    }

    fn parse(&self, text: &str) -> Result<ParsedSource, ParseError> {
        parse_php(text)
    }

    fn file_extensions(&self) -> &[&str] {
        PHP_EXTENSIONS
    }
}
