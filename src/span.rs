use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Requests a downstream formatter/simplifier pass over a synthesized node.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Annotations: u8 {
        /// Normalize whitespace around the node.
        const FORMAT = 0b01;
        /// Elide redundant qualification inside the node.
        const SIMPLIFY = 0b10;
    }
}

/// Byte-offset span in source code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub marks: Annotations,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, marks: Annotations::empty() }
    }

    pub fn dummy() -> Self {
        Self::new(0, 0)
    }

    /// Span for a node built by a rewrite rather than read from source.
    pub fn synthesized(marks: Annotations) -> Self {
        Self { start: 0, end: 0, marks }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely inside `self` (boundaries inclusive).
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both.
    pub fn cover(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_synthesized(&self) -> bool {
        !self.marks.is_empty()
    }
}

/// A value annotated with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self { node, span: Span::dummy() }
    }

    pub fn synthesized(node: T, marks: Annotations) -> Self {
        Self { node, span: Span::synthesized(marks) }
    }
}
