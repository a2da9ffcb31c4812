use super::line_index::LineTypeIndexGenerator;
use super::lines::{DocumentLine, get_line_type};
use super::operations::{Op, compute_length};
use super::selection::Selection;
use super::transform::{DeltaTransform, StandardTransform};

/// Derives [`DocumentLine`]s from an operation stream.
///
/// Segmentation is delegated to a [`DeltaTransform`]; the walker adds line
/// ranges and type-scoped ordinals. Each traversal owns its own ordinal
/// generator, so walking twice yields the same lines.
#[derive(Debug, Clone, Copy)]
pub struct LineWalker<'a> {
    ops: &'a [Op],
    transform: &'a dyn DeltaTransform,
}

impl<'a> LineWalker<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self::with_transform(ops, &StandardTransform)
    }

    pub fn with_transform(ops: &'a [Op], transform: &'a dyn DeltaTransform) -> Self {
        Self { ops, transform }
    }

    pub fn ops(&self) -> &'a [Op] {
        self.ops
    }

    /// Visit every line in stream order, without buffering.
    pub fn each_line(&self, mut predicate: impl FnMut(DocumentLine)) {
        let mut generator = LineTypeIndexGenerator::new();
        let mut first_line_char_at = 0;
        self.transform
            .each_line(self.ops, &mut |delta, attributes, index| {
                let beginning_of_line = first_line_char_at;
                let end_of_line = beginning_of_line + compute_length(&delta);
                // the newline belongs to no line
                first_line_char_at = end_of_line + 1;
                let line_type = get_line_type(Some(&attributes));
                let line_type_index = generator.find_next_line_type_index(&line_type);
                predicate(DocumentLine {
                    index,
                    line_range: Selection::from_bounds(beginning_of_line, end_of_line),
                    delta,
                    line_type,
                    line_type_index,
                });
            });
    }

    pub fn lines(&self) -> Vec<DocumentLine> {
        let mut lines = Vec::new();
        self.each_line(|line| lines.push(line));
        lines
    }
}
