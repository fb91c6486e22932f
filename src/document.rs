use crate::diagnostics::SyntaxError;
use crate::parser::ast::CompilationUnit;
use crate::parser::parse_unit;
use crate::pretty::pretty_print;

/// An immutable snapshot of one source file's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub root: CompilationUnit,
}

impl Document {
    pub fn new(name: impl Into<String>, root: CompilationUnit) -> Self {
        Self { name: name.into(), root }
    }

    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, SyntaxError> {
        Ok(Self::new(name, parse_unit(source)?))
    }

    /// Same document name, new tree.
    pub fn with_root(&self, root: CompilationUnit) -> Self {
        Self { name: self.name.clone(), root }
    }

    /// Canonical source text of the tree.
    pub fn text(&self) -> String {
        pretty_print(&self.root)
    }
}
