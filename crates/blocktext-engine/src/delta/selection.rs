use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` character range.
///
/// Always satisfies `start <= end`; a collapsed selection (`start == end`) is
/// a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a selection from two bounds given in any order.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// A cursor at `position`.
    pub fn collapsed(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[must_use]
    pub fn length(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_collapsed(self) -> bool {
        self.start == self.end
    }

    /// True when `position` lies in `[start, end)`.
    #[must_use]
    pub fn contains(self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    /// Overlapping part of both ranges, if any.
    #[must_use]
    pub fn intersection(self, other: Selection) -> Option<Selection> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Selection { start, end })
    }

    /// Clamp both bounds to `[0, length]`, ordering them if they were given
    /// reversed.
    #[must_use]
    pub fn clamp_to(self, length: usize) -> Selection {
        Selection::from_bounds(self.start.min(length), self.end.min(length))
    }
}
