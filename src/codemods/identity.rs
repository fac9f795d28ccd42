use crate::codemod::Codemod;

/// Leaves every file untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Identity {
    pub const NAME: &'static str = "identity";
}

impl Codemod for Identity {}
