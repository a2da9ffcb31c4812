use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attributes::AttributeMap;

/// Character standing in for embedded content when a stream is flattened to
/// text, so that char offsets in the text match stream offsets.
pub const OBJECT_REPLACEMENT_CHARACTER: char = '\u{FFFC}';

/// Descriptor of embedded content: a `kind` discriminator plus fields only the
/// renderer for that kind understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedDescriptor {
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Payload of an insert operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insert {
    Text(String),
    Embed(EmbedDescriptor),
}

/// An atomic operation over document content.
///
/// Serializes to the usual delta JSON shape: `{"insert": .., "attributes": ..}`,
/// `{"delete": n}` or `{"retain": n}`. Attributes only ever accompany inserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Op {
    Insert {
        insert: Insert,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<AttributeMap>,
    },
    Delete {
        delete: usize,
    },
    Retain {
        retain: usize,
    },
}

impl Op {
    /// Length of this operation in the document coordinate space.
    ///
    /// Text counts Unicode scalar values; embedded content always counts 1.
    pub fn length(&self) -> usize {
        match self {
            Op::Insert {
                insert: Insert::Text(text),
                ..
            } => text.chars().count(),
            Op::Insert {
                insert: Insert::Embed(_),
                ..
            } => 1,
            Op::Delete { delete } => *delete,
            Op::Retain { retain } => *retain,
        }
    }

    /// Text payload of a text insert.
    pub fn text(&self) -> Option<&str> {
        match self {
            Op::Insert {
                insert: Insert::Text(text),
                ..
            } => Some(text),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Op::Insert { attributes, .. } => attributes.as_ref(),
            _ => None,
        }
    }
}

/// True when the operation inserts text rather than embedded content.
pub fn is_text_operation(op: &Op) -> bool {
    op.text().is_some()
}

/// Sum of operation lengths.
pub fn compute_length(ops: &[Op]) -> usize {
    ops.iter().map(Op::length).sum()
}

/// Build a text insert. `None` attributes leave the field out entirely, which
/// is not the same thing as an empty attribute set.
pub fn build_text_operation(text: impl Into<String>, attributes: Option<AttributeMap>) -> Op {
    Op::Insert {
        insert: Insert::Text(text.into()),
        attributes,
    }
}

/// Build an embedded content insert of the given kind.
pub fn build_embedded_operation(kind: impl Into<String>, fields: Map<String, Value>) -> Op {
    Op::Insert {
        insert: Insert::Embed(EmbedDescriptor {
            kind: kind.into(),
            fields,
        }),
        attributes: None,
    }
}

/// Description of an image to be persisted in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescription {
    /// Host-specific image source (URI, asset handle...).
    pub source: Value,
    pub width: u32,
    pub height: u32,
}

/// Build an `image` embed from its description.
pub fn build_image_operation(description: ImageDescription) -> Op {
    let mut fields = Map::new();
    fields.insert("source".to_string(), description.source);
    fields.insert("width".to_string(), Value::from(description.width));
    fields.insert("height".to_string(), Value::from(description.height));
    build_embedded_operation("image", fields)
}

/// Append `op` to `ops`, merging it into the last operation when both are text
/// inserts with equal attributes. Empty text inserts are dropped.
pub fn push_operation(ops: &mut Vec<Op>, op: Op) {
    if op.length() == 0 {
        return;
    }
    if let (
        Some(Op::Insert {
            insert: Insert::Text(last_text),
            attributes: last_attributes,
        }),
        Op::Insert {
            insert: Insert::Text(text),
            attributes,
        },
    ) = (ops.last_mut(), &op)
        && *last_attributes == *attributes
    {
        last_text.push_str(text);
        return;
    }
    ops.push(op);
}

/// Flatten the inserts of a stream to text, rendering each embed as
/// [`OBJECT_REPLACEMENT_CHARACTER`].
pub fn extract_text(ops: &[Op]) -> String {
    let mut text = String::new();
    for op in ops {
        match op {
            Op::Insert {
                insert: Insert::Text(t),
                ..
            } => text.push_str(t),
            Op::Insert {
                insert: Insert::Embed(_),
                ..
            } => text.push(OBJECT_REPLACEMENT_CHARACTER),
            Op::Delete { .. } | Op::Retain { .. } => {}
        }
    }
    text
}
