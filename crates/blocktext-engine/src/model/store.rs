use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::delta::{DeltaUpdate, Op, Selection, compute_length, push_operation};
use crate::events::{Endpoint, OwnerId};

use super::block::{Block, BlockKind, InstanceNumber};
use super::document::DocumentError;

/// What a host needs to render one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockEntry {
    pub instance_number: InstanceNumber,
    pub kind: BlockKind,
    pub delta: Vec<Op>,
    pub selection: Selection,
}

/// Snapshot of the store handed to state listeners.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreState {
    pub blocks: Vec<BlockEntry>,
    pub active_block: Option<InstanceNumber>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StoreEvent {
    StateUpdate,
}

/// Ordered blocks of a document and which one is active.
///
/// Every mutation publishes a [`StoreState`] to the registered listeners once
/// the store is consistent again, so listeners may read the store freely.
/// Changes to a block's stream are published by the document through
/// [`Store::notify`].
#[derive(Debug, Default)]
pub struct Store {
    blocks: RefCell<Vec<Rc<Block>>>,
    active_block: Cell<Option<InstanceNumber>>,
    listeners: Endpoint<StoreEvent, StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `block` at the end and make it the active block.
    pub fn append_block(&self, block: Rc<Block>) {
        let instance_number = block.instance_number();
        self.blocks.borrow_mut().push(block);
        self.active_block.set(Some(instance_number));
        self.notify();
    }

    pub fn has_block(&self) -> bool {
        !self.blocks.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }

    pub fn active_block(&self) -> Option<Rc<Block>> {
        self.active_block.get().and_then(|n| self.block(n))
    }

    pub fn block(&self, instance_number: InstanceNumber) -> Option<Rc<Block>> {
        self.blocks
            .borrow()
            .iter()
            .find(|block| block.instance_number() == instance_number)
            .cloned()
    }

    pub fn blocks(&self) -> Vec<Rc<Block>> {
        self.blocks.borrow().clone()
    }

    pub fn set_active_block(&self, instance_number: InstanceNumber) -> Result<(), DocumentError> {
        if self.block(instance_number).is_none() {
            return Err(DocumentError::UnknownBlock {
                instance: instance_number,
            });
        }
        if self.active_block.replace(Some(instance_number)) != Some(instance_number) {
            self.notify();
        }
        Ok(())
    }

    /// Merge the block `instance_number` into the text block right before it.
    ///
    /// The previous block receives the concatenated stream with a cursor at the
    /// junction and becomes active. Returns the removed block, or `None` when
    /// there is nothing to merge into or one of the blocks is not text.
    pub fn merge_adjacent_text_blocks(&self, instance_number: InstanceNumber) -> Option<Rc<Block>> {
        let (previous, removed) = {
            let mut blocks = self.blocks.borrow_mut();
            let position = blocks
                .iter()
                .position(|block| block.instance_number() == instance_number)?;
            if position == 0 {
                return None;
            }
            if !blocks[position - 1].is_text() || !blocks[position].is_text() {
                return None;
            }
            let removed = blocks.remove(position);
            (Rc::clone(&blocks[position - 1]), removed)
        };

        self.active_block.set(Some(previous.instance_number()));
        let mut merged = previous.delta();
        let junction = compute_length(&merged);
        for op in removed.delta() {
            push_operation(&mut merged, op);
        }
        previous.update_delta(DeltaUpdate::new(merged).with_selection(Selection::collapsed(junction)));
        log::debug!(
            "merged block {} into {}",
            removed.instance_number(),
            previous.instance_number()
        );
        self.notify();
        Some(removed)
    }

    pub fn add_listener(&self, owner: OwnerId, listener: impl Fn(&StoreState) + 'static) {
        self.listeners
            .subscribe(owner, StoreEvent::StateUpdate, listener);
    }

    pub fn remove_listener(&self, owner: OwnerId) {
        self.listeners.release(owner);
    }

    pub fn state(&self) -> StoreState {
        StoreState {
            blocks: self
                .blocks
                .borrow()
                .iter()
                .map(|block| BlockEntry {
                    instance_number: block.instance_number(),
                    kind: block.kind(),
                    delta: block.delta(),
                    selection: block.selection(),
                })
                .collect(),
            active_block: self.active_block.get(),
        }
    }

    /// Publish the current state to every listener.
    pub fn notify(&self) {
        let state = self.state();
        self.listeners.publish(&StoreEvent::StateUpdate, &state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{Op, StandardTransform, attributes, build_text_operation};
    use crate::events::SheetEventDomain;
    use crate::model::block::BlockInterface;
    use crate::model::orchestrator::Orchestrator;
    use pretty_assertions::assert_eq;

    fn block(n: u64, kind: BlockKind, ops: Vec<Op>) -> Rc<Block> {
        let delta = Rc::new(RefCell::new(ops));
        let interface = BlockInterface::new(
            Orchestrator::new(),
            SheetEventDomain::new(),
            {
                let delta = Rc::clone(&delta);
                move |update: DeltaUpdate| *delta.borrow_mut() = update.final_delta
            },
            || {},
            || {},
            move || delta.borrow().clone(),
        );
        Rc::new(Block::new(
            kind,
            InstanceNumber(n),
            Rc::new(StandardTransform),
            interface,
        ))
    }

    fn text_block(n: u64, text: &str) -> Rc<Block> {
        block(n, BlockKind::Text, vec![build_text_operation(text, None)])
    }

    #[test]
    fn test_append_activates_and_notifies() {
        let store = Store::new();
        assert!(!store.has_block());
        let states = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&states);
        store.add_listener(OwnerId::new(), move |state| {
            sink.borrow_mut().push(state.clone())
        });

        store.append_block(text_block(1, "a"));
        store.append_block(text_block(2, "b"));

        assert!(store.has_block());
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.active_block().map(|b| b.instance_number()),
            Some(InstanceNumber(2))
        );
        let states = states.borrow();
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].active_block, Some(InstanceNumber(2)));
        assert_eq!(states[1].blocks.len(), 2);
    }

    #[test]
    fn test_state_carries_stream_and_selection() {
        let store = Store::new();
        let block = text_block(1, "abc");
        block.set_selection(Selection::from_bounds(1, 2));
        store.append_block(Rc::clone(&block));

        let state = store.state();

        assert_eq!(
            state.blocks,
            vec![BlockEntry {
                instance_number: InstanceNumber(1),
                kind: BlockKind::Text,
                delta: vec![build_text_operation("abc", None)],
                selection: Selection::from_bounds(1, 2),
            }]
        );
    }

    #[test]
    fn test_set_active_block_rejects_unknown_instance() {
        let store = Store::new();
        store.append_block(text_block(1, "a"));

        let result = store.set_active_block(InstanceNumber(9));

        assert!(matches!(
            result,
            Err(DocumentError::UnknownBlock {
                instance: InstanceNumber(9)
            })
        ));
        assert_eq!(store.state().active_block, Some(InstanceNumber(1)));
    }

    #[test]
    fn test_merge_concatenates_into_previous() {
        let store = Store::new();
        let bold = Some(attributes([("bold", true)]));
        store.append_block(text_block(1, "Hello"));
        store.append_block(block(
            2,
            BlockKind::Text,
            vec![
                build_text_operation(" world", None),
                build_text_operation("!", bold.clone()),
            ],
        ));

        let removed = store.merge_adjacent_text_blocks(InstanceNumber(2));

        assert_eq!(removed.map(|b| b.instance_number()), Some(InstanceNumber(2)));
        assert_eq!(store.len(), 1);
        let previous = store.active_block().unwrap();
        assert_eq!(previous.instance_number(), InstanceNumber(1));
        assert_eq!(
            previous.delta(),
            vec![
                build_text_operation("Hello world", None),
                build_text_operation("!", bold),
            ]
        );
        assert_eq!(previous.selection(), Selection::collapsed(5));
    }

    #[test]
    fn test_merge_is_noop_for_first_or_embed_blocks() {
        let store = Store::new();
        store.append_block(text_block(1, "a"));
        store.append_block(block(2, BlockKind::Embed, Vec::new()));
        store.append_block(text_block(3, "c"));

        assert!(store.merge_adjacent_text_blocks(InstanceNumber(1)).is_none());
        assert!(store.merge_adjacent_text_blocks(InstanceNumber(3)).is_none());
        assert!(store.merge_adjacent_text_blocks(InstanceNumber(7)).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_listener_can_read_store_during_notification() {
        let store = Rc::new(Store::new());
        let seen = Rc::new(Cell::new(0));
        {
            let weak = Rc::downgrade(&store);
            let seen = Rc::clone(&seen);
            store.add_listener(OwnerId::new(), move |_| {
                if let Some(store) = weak.upgrade() {
                    seen.set(store.blocks().len());
                }
            });
        }

        store.append_block(text_block(1, "a"));

        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let store = Store::new();
        let owner = OwnerId::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.add_listener(owner, move |_| counter.set(counter.get() + 1));

        store.append_block(text_block(1, "a"));
        store.remove_listener(owner);
        store.append_block(text_block(2, "b"));

        assert_eq!(calls.get(), 1);
    }
}
