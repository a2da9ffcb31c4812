use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::attributes::{AttributeMap, LINE_TYPE_KEY, LineType};
use super::operations::Op;
use super::selection::Selection;

static ORDERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\s\s)").expect("valid ordered heading pattern"));
static BULLET_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(•\s\s)").expect("valid bullet heading pattern"));

/// A line of text with its position in the stream.
///
/// Given `text`, the characters of a stream, and `line` any line extracted from
/// it, the characters of `text` in `line.line_range()` are exactly the text of
/// the line's operations.
pub trait GenericLine {
    fn index(&self) -> usize;
    fn line_range(&self) -> Selection;
}

/// A line derived from an operation stream.
///
/// Lines are projections: they are recomputed on every read and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLine {
    /// 0-based position among the stream's lines.
    pub index: usize,
    /// `[start, end)` characters of the line, newline excluded.
    pub line_range: Selection,
    /// Operations of the line, newline excluded.
    pub delta: Vec<Op>,
    pub line_type: LineType,
    /// Position of this line in the current run of lines of the same type.
    pub line_type_index: usize,
}

impl GenericLine for DocumentLine {
    fn index(&self) -> usize {
        self.index
    }

    fn line_range(&self) -> Selection {
        self.line_range
    }
}

/// Line types whose rendering prepends glyphs which are not stored.
pub fn is_line_type_length_modifier(line_type: &LineType) -> bool {
    matches!(line_type, LineType::Ol | LineType::Ul)
}

/// Line types a new line should inherit when the user breaks a line of that
/// type. The host decides whether to apply it.
pub fn should_line_type_propagate_to_next_line(line_type: &LineType) -> bool {
    matches!(line_type, LineType::Ol | LineType::Ul)
}

/// Whether `line` overlaps `selection`, boundaries included.
///
/// A cursor sitting on the boundary between two lines is in both of them.
pub fn is_line_in_selection(selection: Selection, line: &impl GenericLine) -> bool {
    let Selection {
        start: beginning_of_line,
        end: end_of_line,
    } = line.line_range();
    (selection.start >= beginning_of_line && selection.start <= end_of_line)
        || (selection.start <= end_of_line && selection.end >= beginning_of_line)
}

/// Line type carried by a newline's attributes, `normal` when absent.
pub fn get_line_type(line_attributes: Option<&AttributeMap>) -> LineType {
    line_attributes
        .and_then(|attrs| attrs.get(LINE_TYPE_KEY))
        .and_then(|value| value.as_str())
        .map(LineType::from)
        .unwrap_or_default()
}

/// Glyphs rendered before a line of the given type; `index` is the line's
/// type-scoped ordinal.
pub fn get_heading_glyph(line_type: &LineType, index: usize) -> Cow<'static, str> {
    match line_type {
        LineType::Ol => Cow::Owned(format!("{}.  ", index + 1)),
        LineType::Ul => Cow::Borrowed("•  "),
        LineType::Quoted => Cow::Borrowed("  "),
        _ => Cow::Borrowed(""),
    }
}

/// Pattern matching the rendered glyphs of a length modifier line at the
/// beginning of a rendered line.
pub fn get_heading_pattern(line_type: &LineType) -> &'static Regex {
    match line_type {
        LineType::Ol => &ORDERED_HEADING,
        _ => &BULLET_HEADING,
    }
}

/// Remove the rendered glyphs of a length modifier line, leaving the stored
/// text. Lines of other types are returned as is.
pub fn strip_heading<'a>(line_type: &LineType, rendered: &'a str) -> &'a str {
    if !is_line_type_length_modifier(line_type) {
        return rendered;
    }
    match get_heading_pattern(line_type).find(rendered) {
        Some(found) => &rendered[found.end()..],
        None => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::attributes::attributes;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Range(usize, usize);

    impl GenericLine for Range {
        fn index(&self) -> usize {
            0
        }

        fn line_range(&self) -> Selection {
            Selection::from_bounds(self.0, self.1)
        }
    }

    #[rstest]
    #[case(LineType::Ol, true)]
    #[case(LineType::Ul, true)]
    #[case(LineType::Normal, false)]
    #[case(LineType::Quoted, false)]
    #[case(LineType::Other("todo".into()), false)]
    fn test_length_modifier_and_propagation(#[case] line_type: LineType, #[case] expected: bool) {
        assert_eq!(is_line_type_length_modifier(&line_type), expected);
        assert_eq!(should_line_type_propagate_to_next_line(&line_type), expected);
    }

    #[rstest]
    #[case(Selection::collapsed(3), true)] // end of first line
    #[case(Selection::collapsed(0), true)]
    #[case(Selection::from_bounds(1, 2), true)]
    #[case(Selection::collapsed(4), false)] // start of next line
    #[case(Selection::from_bounds(3, 4), true)] // newline only
    #[case(Selection::from_bounds(5, 9), false)]
    fn test_is_line_in_selection(#[case] selection: Selection, #[case] expected: bool) {
        // "abc\ndef": first line is [0, 3)
        assert_eq!(is_line_in_selection(selection, &Range(0, 3)), expected);
    }

    #[test]
    fn test_cursor_on_shared_boundary_is_in_both_lines() {
        let cursor = Selection::collapsed(4);
        assert!(is_line_in_selection(cursor, &Range(0, 4)));
        assert!(is_line_in_selection(cursor, &Range(4, 8)));
    }

    #[test]
    fn test_get_line_type() {
        assert_eq!(get_line_type(None), LineType::Normal);
        assert_eq!(get_line_type(Some(&AttributeMap::new())), LineType::Normal);
        assert_eq!(
            get_line_type(Some(&attributes([(LINE_TYPE_KEY, "ul")]))),
            LineType::Ul
        );
        assert_eq!(
            get_line_type(Some(&attributes([(LINE_TYPE_KEY, true)]))),
            LineType::Normal
        );
    }

    #[rstest]
    #[case(LineType::Ol, 0, "1.  ")]
    #[case(LineType::Ol, 9, "10.  ")]
    #[case(LineType::Ul, 4, "•  ")]
    #[case(LineType::Quoted, 2, "  ")]
    #[case(LineType::Normal, 0, "")]
    fn test_get_heading_glyph(
        #[case] line_type: LineType,
        #[case] index: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(get_heading_glyph(&line_type, index), expected);
    }

    #[rstest]
    #[case(LineType::Ol, "12.  Twelve", "Twelve")]
    #[case(LineType::Ol, "•  Not ordered", "•  Not ordered")]
    #[case(LineType::Ul, "•  Bullet", "Bullet")]
    #[case(LineType::Ul, "1.  Not a bullet", "1.  Not a bullet")]
    #[case(LineType::Normal, "1.  Kept", "1.  Kept")]
    fn test_strip_heading(
        #[case] line_type: LineType,
        #[case] rendered: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(strip_heading(&line_type, rendered), expected);
    }

    #[test]
    fn test_heading_pattern_matches_rendered_glyph() {
        for index in [0, 1, 41] {
            let glyph = get_heading_glyph(&LineType::Ol, index);
            assert!(get_heading_pattern(&LineType::Ol).is_match(&glyph));
        }
        let bullet = get_heading_glyph(&LineType::Ul, 0);
        assert!(get_heading_pattern(&LineType::Ul).is_match(&bullet));
    }
}
