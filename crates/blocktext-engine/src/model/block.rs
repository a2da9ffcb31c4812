use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::delta::{
    AttributeMap, DeltaTransform, DeltaUpdate, DocumentLine, LineWalker, Op, Selection,
    compute_length,
};
use crate::events::{OwnerId, SheetEventDomain};

use super::orchestrator::Orchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Text,
    Embed,
}

/// Identity of a block within its document. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceNumber(pub u64);

impl fmt::Display for InstanceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capabilities a document grants to one of its blocks.
///
/// Built once when the block is created and never changed afterwards.
#[derive(Clone)]
pub struct BlockInterface {
    orchestrator: Orchestrator,
    sheet_event_dom: SheetEventDomain,
    update_delta: Rc<dyn Fn(DeltaUpdate)>,
    on_press_backspace_from_origin: Rc<dyn Fn()>,
    on_press_enter: Rc<dyn Fn()>,
    get_delta: Rc<dyn Fn() -> Vec<Op>>,
}

impl BlockInterface {
    pub fn new(
        orchestrator: Orchestrator,
        sheet_event_dom: SheetEventDomain,
        update_delta: impl Fn(DeltaUpdate) + 'static,
        on_press_backspace_from_origin: impl Fn() + 'static,
        on_press_enter: impl Fn() + 'static,
        get_delta: impl Fn() -> Vec<Op> + 'static,
    ) -> Self {
        Self {
            orchestrator,
            sheet_event_dom,
            update_delta: Rc::new(update_delta),
            on_press_backspace_from_origin: Rc::new(on_press_backspace_from_origin),
            on_press_enter: Rc::new(on_press_enter),
            get_delta: Rc::new(get_delta),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn sheet_event_dom(&self) -> &SheetEventDomain {
        &self.sheet_event_dom
    }

    pub fn update_delta(&self, update: DeltaUpdate) {
        (self.update_delta)(update)
    }

    pub fn on_press_backspace_from_origin(&self) {
        (self.on_press_backspace_from_origin)()
    }

    pub fn on_press_enter(&self) {
        (self.on_press_enter)()
    }

    pub fn get_delta(&self) -> Vec<Op> {
        (self.get_delta)()
    }
}

impl fmt::Debug for BlockInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockInterface")
            .field("orchestrator", &self.orchestrator)
            .field("sheet_event_dom", &self.sheet_event_dom)
            .finish_non_exhaustive()
    }
}

/// A unit of content in a document: either a text block holding its own
/// operation stream, or a single piece of embedded content.
///
/// Blocks are shared as `Rc<Block>`; state that changes after creation lives
/// behind `Cell`/`RefCell` so that no borrow outlives a method call.
#[derive(Debug)]
pub struct Block {
    kind: BlockKind,
    instance_number: InstanceNumber,
    owner: OwnerId,
    selection: Cell<Selection>,
    cursor_attributes: RefCell<AttributeMap>,
    transform: Rc<dyn DeltaTransform>,
    interface: BlockInterface,
}

impl Block {
    pub fn new(
        kind: BlockKind,
        instance_number: InstanceNumber,
        transform: Rc<dyn DeltaTransform>,
        interface: BlockInterface,
    ) -> Self {
        Self {
            kind,
            instance_number,
            owner: OwnerId::new(),
            selection: Cell::new(Selection::default()),
            cursor_attributes: RefCell::new(AttributeMap::new()),
            transform,
            interface,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }

    pub fn instance_number(&self) -> InstanceNumber {
        self.instance_number
    }

    /// Owner under which this block's controller subscribes to the
    /// orchestrator. Released when the block leaves the document.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn interface(&self) -> &BlockInterface {
        &self.interface
    }

    pub fn transform(&self) -> &dyn DeltaTransform {
        self.transform.as_ref()
    }

    pub fn delta(&self) -> Vec<Op> {
        self.interface.get_delta()
    }

    pub fn len(&self) -> usize {
        compute_length(&self.delta())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selection(&self) -> Selection {
        self.selection.get()
    }

    /// Move the selection, clamped to the stream. Pending cursor attributes
    /// only hold for the position they were set at, so moving drops them.
    pub fn set_selection(&self, selection: Selection) {
        let selection = selection.clamp_to(self.len());
        if selection != self.selection.get() {
            self.cursor_attributes.borrow_mut().clear();
        }
        self.selection.set(selection);
    }

    /// Adopt a new stream, then the overriding selection if there is one, and
    /// forward the update to the block's controller.
    pub fn update_delta(&self, update: DeltaUpdate) {
        if let Some(selection) = update.overriding_selection {
            let selection = selection.clamp_to(compute_length(&update.final_delta));
            self.cursor_attributes.borrow_mut().clear();
            self.selection.set(selection);
        }
        self.interface.update_delta(update);
    }

    pub fn cursor_attributes(&self) -> AttributeMap {
        self.cursor_attributes.borrow().clone()
    }

    /// Merge `attributes` over the pending cursor attributes and return the
    /// result.
    pub fn set_cursor_attributes(&self, attributes: AttributeMap) -> AttributeMap {
        let mut cursor_attributes = self.cursor_attributes.borrow_mut();
        cursor_attributes.extend(attributes);
        cursor_attributes.clone()
    }

    /// Backspace at the very beginning of the block asks the document to merge
    /// it into the previous one. Returns whether the request was made.
    pub fn press_backspace(&self) -> bool {
        if self.selection.get() != Selection::collapsed(0) {
            return false;
        }
        log::trace!("backspace from origin of block {}", self.instance_number);
        self.interface.on_press_backspace_from_origin();
        true
    }

    pub fn press_enter(&self) {
        log::trace!("enter in block {}", self.instance_number);
        self.interface.on_press_enter();
    }

    pub fn lines(&self) -> Vec<DocumentLine> {
        let ops = self.delta();
        LineWalker::with_transform(&ops, self.transform.as_ref()).lines()
    }
}
