//! Built-in codemods.
//!
//! | Name | Behavior |
//! | --- | --- |
//! | `identity` | No hooks; reproduces its input byte for byte. |
//! | `replace-string-literals` | Replaces every string literal with a double-quoted `replacement` (default `foo`). |
//! | `rename-function` | Renames the first declared function (or the one named `from`) to `to`. |

mod identity;
mod rename_function;
mod string_literals;

pub use identity::Identity;
pub use rename_function::RenameFunction;
pub use string_literals::{ReplaceStringLiterals, StringLiteralReplacer};

use crate::registry::CodemodRegistry;

/// Register every built-in codemod on `registry`.
pub fn register_builtin(registry: &mut CodemodRegistry) {
    registry.register(Identity::NAME, |_init| Ok(Box::new(Identity)));
    registry.register(ReplaceStringLiterals::NAME, |init| {
        Ok(Box::new(ReplaceStringLiterals::from_init(&init)?))
    });
    registry.register(RenameFunction::NAME, |init| {
        Ok(Box::new(RenameFunction::from_init(init)?))
    });
}
