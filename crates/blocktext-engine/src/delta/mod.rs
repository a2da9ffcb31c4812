//! Operation streams and the lines derived from them.
//!
//! - **`operations`**: `Op` and its constructors, length accounting
//! - **`attributes`**: attribute maps and line types
//! - **`selection`**: half-open character ranges
//! - **`lines`**: `DocumentLine` and line type utilities (glyphs, patterns)
//! - **`line_index`**: type-scoped ordinals for list numbering
//! - **`line_walker`**: segmentation of a stream into lines
//! - **`transform`**: the `DeltaTransform` contract and its standard implementation
//! - **`update`**: `DeltaUpdate`, the outcome of a transform handed to a block

pub mod attributes;
pub mod line_index;
pub mod line_walker;
pub mod lines;
pub mod operations;
pub mod selection;
pub mod transform;
pub mod update;

pub use attributes::{
    AttributeMap, AttributeValue, LINE_TYPE_KEY, LineType, attributes, merge_attributes_left,
};
pub use line_index::LineTypeIndexGenerator;
pub use line_walker::LineWalker;
pub use lines::{
    DocumentLine, GenericLine, get_heading_glyph, get_heading_pattern, get_line_type,
    is_line_in_selection, is_line_type_length_modifier, should_line_type_propagate_to_next_line,
    strip_heading,
};
pub use operations::{
    EmbedDescriptor, ImageDescription, Insert, OBJECT_REPLACEMENT_CHARACTER, Op,
    build_embedded_operation, build_image_operation, build_text_operation, compute_length,
    extract_text, is_text_operation, push_operation,
};
pub use selection::Selection;
pub use transform::{DeltaTransform, StandardTransform};
pub use update::DeltaUpdate;
