use super::operations::Op;
use super::selection::Selection;

/// Result of a transform applied to a block, as handed to the block and then to
/// its controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaUpdate {
    /// The block's full operation stream after the change.
    pub final_delta: Vec<Op>,
    /// Selection the block should adopt, when the change moves the cursor.
    pub overriding_selection: Option<Selection>,
}

impl DeltaUpdate {
    pub fn new(final_delta: Vec<Op>) -> Self {
        Self {
            final_delta,
            overriding_selection: None,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.overriding_selection = Some(selection);
        self
    }
}
