use super::attributes::LineType;

/// Hands out type-scoped ordinals while walking the lines of one stream.
///
/// A run of consecutive lines of the same type is numbered `0, 1, 2...`; any
/// line of another type ends the run, and the next line of that type starts
/// over at 0. Create one generator per traversal.
#[derive(Debug, Default)]
pub struct LineTypeIndexGenerator {
    previous: Option<LineType>,
    run: usize,
}

impl LineTypeIndexGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_next_line_type_index(&mut self, line_type: &LineType) -> usize {
        if self.previous.as_ref() == Some(line_type) {
            self.run += 1;
        } else {
            self.previous = Some(line_type.clone());
            self.run = 0;
        }
        self.run
    }
}
