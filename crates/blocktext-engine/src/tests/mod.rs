//! Helpers shared by the unit tests of the model layer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::delta::{AttributeMap, LineType, Op, build_text_operation};
use crate::events::{OwnerId, SheetEventDomain};
use crate::model::{Consumer, StoreState};

/// A host that keeps everything the document tells it.
pub struct RecordingConsumer {
    consumer: Consumer,
    states: Rc<RefCell<Vec<StoreState>>>,
    line_types: Rc<RefCell<Vec<LineType>>>,
    text_attributes: Rc<RefCell<Vec<AttributeMap>>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        let domain = SheetEventDomain::new();
        let owner = OwnerId::new();

        let line_types = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&line_types);
        domain.add_selected_line_type_change_listener(owner, move |line_type| {
            sink.borrow_mut().push(line_type.clone())
        });

        let text_attributes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&text_attributes);
        domain.add_selected_text_attributes_change_listener(owner, move |attributes| {
            sink.borrow_mut().push(attributes.clone())
        });

        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&states);
        let consumer = Consumer::new(domain, move |state| sink.borrow_mut().push(state.clone()));

        Self {
            consumer,
            states,
            line_types,
            text_attributes,
        }
    }

    /// The consumer to register. Clones share their owner identity.
    pub fn consumer(&self) -> Consumer {
        self.consumer.clone()
    }

    pub fn states(&self) -> Vec<StoreState> {
        self.states.borrow().clone()
    }

    pub fn line_types(&self) -> Vec<LineType> {
        self.line_types.borrow().clone()
    }

    pub fn text_attributes(&self) -> Vec<AttributeMap> {
        self.text_attributes.borrow().clone()
    }
}

impl Default for RecordingConsumer {
    fn default() -> Self {
        Self::new()
    }
}

/// A stream of plain lines, each ended by a newline.
pub fn text_with_lines(lines: &[&str]) -> Vec<Op> {
    let mut text = lines.join("\n");
    text.push('\n');
    vec![build_text_operation(text, None)]
}
