//! Selection-scoped transforms over a single block's operation stream.
//!
//! The orchestration layer only depends on the [`DeltaTransform`] contract;
//! [`StandardTransform`] is the implementation blocks use unless the host
//! provides its own. Transforms expect document streams, made of inserts only:
//! segmentation stops at the first delete or retain.

use std::fmt;

use super::attributes::{AttributeMap, AttributeValue, LINE_TYPE_KEY, LineType};
use super::lines::{GenericLine, get_line_type, is_line_in_selection};
use super::operations::{Insert, Op, build_text_operation, compute_length, push_operation};
use super::selection::Selection;

/// Operations the editing core needs from a delta implementation.
pub trait DeltaTransform: fmt::Debug {
    /// Call `predicate` with the operations, newline attributes and 0-based
    /// index of each line, in order.
    fn each_line(&self, ops: &[Op], predicate: &mut dyn FnMut(Vec<Op>, AttributeMap, usize));

    /// Set the line type of every line touched by `selection`.
    fn apply_line_type_to_selection(
        &self,
        ops: &[Op],
        selection: Selection,
        line_type: &LineType,
    ) -> Vec<Op>;

    /// Set `attribute_name` on the text in `selection`; a null value removes it.
    fn apply_text_transform_to_selection(
        &self,
        ops: &[Op],
        selection: Selection,
        attribute_name: &str,
        attribute_value: &AttributeValue,
    ) -> Vec<Op>;

    /// Line type shared by all lines touched by `selection`, `normal` if they
    /// differ.
    fn get_line_type_in_selection(&self, ops: &[Op], selection: Selection) -> LineType;

    /// Text attributes shared by all the selected characters, or the attributes
    /// of the character before a cursor.
    fn get_selected_text_attributes(&self, ops: &[Op], selection: Selection) -> AttributeMap;
}

/// The stock [`DeltaTransform`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTransform;

/// A line of a stream together with the newline that ends it, if any.
struct Segment {
    index: usize,
    range: Selection,
    ops: Vec<Op>,
    newline: Option<Op>,
}

impl Segment {
    fn line_type(&self) -> LineType {
        get_line_type(self.newline.as_ref().and_then(Op::attributes))
    }
}

impl GenericLine for Segment {
    fn index(&self) -> usize {
        self.index
    }

    fn line_range(&self) -> Selection {
        self.range
    }
}

/// Walk the lines of a stream in order, handing each one to `visit` as soon
/// as its newline is read. A trailing line without newline is only visited
/// when it is not empty.
fn for_each_segment(ops: &[Op], visit: &mut dyn FnMut(Segment)) {
    let mut line: Vec<Op> = Vec::new();
    let mut index = 0;
    let mut start = 0;

    let mut close = |line: &mut Vec<Op>, newline: Option<Op>| {
        let ops = std::mem::take(line);
        let end = start + compute_length(&ops);
        visit(Segment {
            index,
            range: Selection::from_bounds(start, end),
            ops,
            newline,
        });
        index += 1;
        start = end + 1;
    };

    for op in ops {
        match op {
            Op::Insert {
                insert: Insert::Text(text),
                attributes,
            } => {
                let mut rest = text.as_str();
                while let Some(at) = rest.find('\n') {
                    push_operation(&mut line, build_text_operation(&rest[..at], attributes.clone()));
                    let newline = build_text_operation("\n", attributes.clone());
                    close(&mut line, Some(newline));
                    rest = &rest[at + 1..];
                }
                push_operation(&mut line, build_text_operation(rest, attributes.clone()));
            }
            Op::Insert { .. } => line.push(op.clone()),
            Op::Delete { .. } | Op::Retain { .. } => return,
        }
    }
    if compute_length(&line) > 0 {
        close(&mut line, None);
    }
}

fn segments(ops: &[Op]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for_each_segment(ops, &mut |segment| segments.push(segment));
    segments
}

/// Copy of `attributes` with `key` set to `value`, or removed when `value` is
/// `None`. An empty result becomes `None`.
fn with_attribute(
    attributes: Option<&AttributeMap>,
    key: &str,
    value: Option<&AttributeValue>,
) -> Option<AttributeMap> {
    let mut attributes = attributes.cloned().unwrap_or_default();
    match value {
        Some(value) => {
            attributes.insert(key.to_string(), value.clone());
        }
        None => {
            attributes.remove(key);
        }
    }
    (!attributes.is_empty()).then_some(attributes)
}

fn with_line_type(attributes: Option<&AttributeMap>, line_type: &LineType) -> Option<AttributeMap> {
    let value = AttributeValue::from(line_type.as_str());
    match line_type {
        LineType::Normal => with_attribute(attributes, LINE_TYPE_KEY, None),
        _ => with_attribute(attributes, LINE_TYPE_KEY, Some(&value)),
    }
}

fn intersect(common: &mut Option<AttributeMap>, attributes: Option<&AttributeMap>) {
    let attributes = attributes.cloned().unwrap_or_default();
    match common {
        Some(common) => common.retain(|key, value| attributes.get(key) == Some(value)),
        None => *common = Some(attributes),
    }
}

impl DeltaTransform for StandardTransform {
    fn each_line(&self, ops: &[Op], predicate: &mut dyn FnMut(Vec<Op>, AttributeMap, usize)) {
        for_each_segment(ops, &mut |segment| {
            let attributes = segment
                .newline
                .as_ref()
                .and_then(Op::attributes)
                .cloned()
                .unwrap_or_default();
            predicate(segment.ops, attributes, segment.index);
        });
    }

    fn apply_line_type_to_selection(
        &self,
        ops: &[Op],
        selection: Selection,
        line_type: &LineType,
    ) -> Vec<Op> {
        let mut updated = Vec::with_capacity(ops.len());
        let mut open_last_line = false;
        for segment in segments(ops) {
            let selected = is_line_in_selection(selection, &segment);
            open_last_line = segment.newline.is_none();
            for op in segment.ops {
                push_operation(&mut updated, op);
            }
            match segment.newline {
                Some(newline) if selected => {
                    let attributes = with_line_type(newline.attributes(), line_type);
                    push_operation(&mut updated, build_text_operation("\n", attributes));
                }
                Some(newline) => push_operation(&mut updated, newline),
                // A line type lives on a newline: give the last line one.
                None if selected && *line_type != LineType::Normal => {
                    let attributes = with_line_type(None, line_type);
                    push_operation(&mut updated, build_text_operation("\n", attributes));
                }
                None => {}
            }
        }
        // The empty line after the last newline (or of an empty stream) holds
        // the cursor when the selection starts there.
        if !open_last_line
            && *line_type != LineType::Normal
            && selection.start >= compute_length(&updated)
        {
            let attributes = with_line_type(None, line_type);
            push_operation(&mut updated, build_text_operation("\n", attributes));
        }
        updated
    }

    fn apply_text_transform_to_selection(
        &self,
        ops: &[Op],
        selection: Selection,
        attribute_name: &str,
        attribute_value: &AttributeValue,
    ) -> Vec<Op> {
        if selection.is_collapsed() {
            return ops.to_vec();
        }
        let value = (!attribute_value.is_null()).then_some(attribute_value);
        let mut updated = Vec::with_capacity(ops.len());
        let mut offset = 0;

        for op in ops {
            let length = op.length();
            match op {
                Op::Insert {
                    insert: Insert::Text(text),
                    attributes,
                } => {
                    let formatted_attributes =
                        with_attribute(attributes.as_ref(), attribute_name, value);
                    let mut run = String::new();
                    let mut run_formatted = false;
                    for (i, ch) in text.chars().enumerate() {
                        let formatted = ch != '\n' && selection.contains(offset + i);
                        if formatted != run_formatted && !run.is_empty() {
                            let run_attributes = if run_formatted {
                                formatted_attributes.clone()
                            } else {
                                attributes.clone()
                            };
                            push_operation(
                                &mut updated,
                                build_text_operation(std::mem::take(&mut run), run_attributes),
                            );
                        }
                        run_formatted = formatted;
                        run.push(ch);
                    }
                    let run_attributes = if run_formatted {
                        formatted_attributes
                    } else {
                        attributes.clone()
                    };
                    push_operation(&mut updated, build_text_operation(run, run_attributes));
                }
                Op::Insert {
                    insert: embed @ Insert::Embed(_),
                    attributes,
                } if selection.contains(offset) => {
                    push_operation(
                        &mut updated,
                        Op::Insert {
                            insert: embed.clone(),
                            attributes: with_attribute(attributes.as_ref(), attribute_name, value),
                        },
                    );
                }
                _ => push_operation(&mut updated, op.clone()),
            }
            offset += length;
        }
        updated
    }

    fn get_line_type_in_selection(&self, ops: &[Op], selection: Selection) -> LineType {
        let mut types = segments(ops)
            .into_iter()
            .filter(|segment| is_line_in_selection(selection, segment))
            .map(|segment| segment.line_type());
        match types.next() {
            Some(first) if types.all(|t| t == first) => first,
            _ => LineType::Normal,
        }
    }

    fn get_selected_text_attributes(&self, ops: &[Op], selection: Selection) -> AttributeMap {
        let range = if selection.is_collapsed() {
            match selection.start.checked_sub(1) {
                Some(before) => Selection::from_bounds(before, selection.start),
                None => return AttributeMap::new(),
            }
        } else {
            selection
        };

        let mut common: Option<AttributeMap> = None;
        let mut offset = 0;
        for op in ops {
            let length = op.length();
            if let Some(text) = op.text() {
                let selects_text = text
                    .chars()
                    .enumerate()
                    .any(|(i, ch)| ch != '\n' && range.contains(offset + i));
                if selects_text {
                    intersect(&mut common, op.attributes());
                }
            }
            offset += length;
        }

        let mut attributes = common.unwrap_or_default();
        attributes.remove(LINE_TYPE_KEY);
        attributes
    }
}
