use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::config::{ConfigError, DocumentConfig};
use crate::delta::{
    AttributeMap, AttributeValue, DeltaTransform, DeltaUpdate, LineType, Op, StandardTransform,
    attributes, merge_attributes_left,
};
use crate::events::{OwnerId, SheetEventDomain};

use super::block::{Block, BlockInterface, BlockKind, InstanceNumber};
use super::orchestrator::{BlockControllerEvent, Orchestrator};
use super::store::{Store, StoreState};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("A consumer is already registered on this document")]
    ConsumerAlreadyRegistered,

    #[error("This consumer is not the one registered on the document")]
    ConsumerNotRegistered,

    #[error("The document has no consumer")]
    NoConsumer,

    #[error("Block {instance} is not a text block")]
    NotATextBlock { instance: InstanceNumber },

    #[error("No block {instance} in this document")]
    UnknownBlock { instance: InstanceNumber },
}

/// The host side of a document: who it is, how it wants to hear about store
/// changes, and the signal source it sends requests through.
#[derive(Clone)]
pub struct Consumer {
    owner: OwnerId,
    handle_on_document_state_update: Rc<dyn Fn(&StoreState)>,
    sheet_event_dom: SheetEventDomain,
}

impl Consumer {
    pub fn new(
        sheet_event_dom: SheetEventDomain,
        handle_on_document_state_update: impl Fn(&StoreState) + 'static,
    ) -> Self {
        Self {
            owner: OwnerId::new(),
            handle_on_document_state_update: Rc::new(handle_on_document_state_update),
            sheet_event_dom,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn sheet_event_dom(&self) -> &SheetEventDomain {
        &self.sheet_event_dom
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("owner", &self.owner)
            .field("sheet_event_dom", &self.sheet_event_dom)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct DocumentInner {
    owner: OwnerId,
    config: DocumentConfig,
    transform: Rc<dyn DeltaTransform>,
    store: Store,
    orchestrator: Orchestrator,
    consumer: RefCell<Option<Consumer>>,
    next_instance_number: Cell<u64>,
}

/// A document made of blocks, driven by a single host.
///
/// The document is dormant until a [`Consumer`] registers: registration
/// creates the first block, and from then on the host's requests are applied
/// to the active block. Releasing the consumer makes it dormant again, keeping
/// its blocks.
#[derive(Debug)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self::with_transform(config, Rc::new(StandardTransform))
    }

    pub fn with_transform(config: DocumentConfig, transform: Rc<dyn DeltaTransform>) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                owner: OwnerId::new(),
                config,
                transform,
                store: Store::new(),
                orchestrator: Orchestrator::new(),
                consumer: RefCell::new(None),
                next_instance_number: Cell::new(0),
            }),
        }
    }

    /// A document configured from the file at `config_path`, with defaults
    /// when the file does not exist.
    pub fn from_config_path(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = DocumentConfig::load_from_path(config_path)?.unwrap_or_default();
        Ok(Self::with_config(config))
    }

    /// A document configured from the user's config file.
    pub fn from_user_config() -> Result<Self, ConfigError> {
        Ok(Self::with_config(DocumentConfig::load()?))
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Where block controllers subscribe to the updates of their block.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    pub fn is_active(&self) -> bool {
        self.inner.consumer.borrow().is_some()
    }

    pub fn register_consumer(&self, consumer: Consumer) -> Result<(), DocumentError> {
        if self.is_active() {
            log::warn!("rejected consumer {:?}: one is registered", consumer.owner);
            return Err(DocumentError::ConsumerAlreadyRegistered);
        }
        let inner = &self.inner;

        let handler = Rc::clone(&consumer.handle_on_document_state_update);
        inner
            .store
            .add_listener(consumer.owner, move |state| handler(state));

        let document = Rc::downgrade(inner);
        consumer
            .sheet_event_dom
            .add_switch_line_type_in_selection_listener(inner.owner, move |line_type| {
                let Some(inner) = document.upgrade() else {
                    return;
                };
                if let Err(err) = inner.switch_line_type_in_selection(line_type) {
                    log::error!("could not switch line type to {line_type}: {err}");
                }
            });

        let document = Rc::downgrade(inner);
        consumer
            .sheet_event_dom
            .add_apply_text_transform_to_selection_listener(
                inner.owner,
                move |attribute_name, attribute_value| {
                    let Some(inner) = document.upgrade() else {
                        return;
                    };
                    if let Err(err) =
                        inner.apply_text_transform_to_selection(attribute_name, attribute_value)
                    {
                        log::error!("could not apply {attribute_name}: {err}");
                    }
                },
            );

        log::debug!("registered consumer {:?}", consumer.owner);
        *inner.consumer.borrow_mut() = Some(consumer);
        inner.insert_block(inner.config.initial_block_kind)?;
        Ok(())
    }

    pub fn release_consumer(&self, consumer: &Consumer) -> Result<(), DocumentError> {
        let inner = &self.inner;
        let registered = inner.consumer.borrow().as_ref().map(Consumer::owner);
        if registered != Some(consumer.owner) {
            return Err(DocumentError::ConsumerNotRegistered);
        }
        inner.store.remove_listener(consumer.owner);
        consumer.sheet_event_dom.release(inner.owner);
        inner.orchestrator.release_all();
        *inner.consumer.borrow_mut() = None;
        log::debug!("released consumer {:?}", consumer.owner);
        Ok(())
    }

    /// Append a new block of `kind` and make it active.
    pub fn insert_block(&self, kind: BlockKind) -> Result<Rc<Block>, DocumentError> {
        self.inner.insert_block(kind)
    }

    /// Set the line type of the lines touched by the active block's selection.
    ///
    /// Returns the line type now found in the selection, or `None` when there
    /// is no block to act on.
    pub fn switch_line_type_in_selection(
        &self,
        line_type: &LineType,
    ) -> Result<Option<LineType>, DocumentError> {
        self.inner.switch_line_type_in_selection(line_type)
    }

    /// Set a text attribute over the active block's selection, or at its
    /// cursor for the next input.
    ///
    /// Returns the attributes the host should now display as selected.
    pub fn apply_text_transform_to_selection(
        &self,
        attribute_name: &str,
        attribute_value: &AttributeValue,
    ) -> Result<Option<AttributeMap>, DocumentError> {
        self.inner
            .apply_text_transform_to_selection(attribute_name, attribute_value)
    }

    pub fn emit_to_block(&self, instance_number: InstanceNumber, event: BlockControllerEvent) {
        self.inner
            .orchestrator
            .emit_to_block_controller(instance_number, event);
    }

    pub fn active_block(&self) -> Option<Rc<Block>> {
        self.inner.store.active_block()
    }

    pub fn block(&self, instance_number: InstanceNumber) -> Option<Rc<Block>> {
        self.inner.store.block(instance_number)
    }

    pub fn blocks(&self) -> Vec<Rc<Block>> {
        self.inner.store.blocks()
    }

    pub fn set_active_block(&self, instance_number: InstanceNumber) -> Result<(), DocumentError> {
        self.inner.store.set_active_block(instance_number)?;
        log::debug!("activated block {instance_number}");
        Ok(())
    }
}

impl DocumentInner {
    fn sheet_event_dom(&self) -> Option<SheetEventDomain> {
        self.consumer
            .borrow()
            .as_ref()
            .map(|consumer| consumer.sheet_event_dom.clone())
    }

    fn next_instance_number(&self) -> InstanceNumber {
        let next = self.next_instance_number.get() + 1;
        self.next_instance_number.set(next);
        InstanceNumber(next)
    }

    fn insert_block(self: &Rc<Self>, kind: BlockKind) -> Result<Rc<Block>, DocumentError> {
        let Some(sheet_event_dom) = self.sheet_event_dom() else {
            return Err(DocumentError::NoConsumer);
        };
        let instance_number = self.next_instance_number();
        let delta: Rc<RefCell<Vec<Op>>> = Rc::default();

        let update_delta = {
            let delta = Rc::clone(&delta);
            let document = Rc::downgrade(self);
            move |update: DeltaUpdate| {
                delta.borrow_mut().clone_from(&update.final_delta);
                let Some(inner) = document.upgrade() else {
                    return;
                };
                inner.orchestrator.emit_to_block_controller(
                    instance_number,
                    BlockControllerEvent::DeltaUpdate(update),
                );
                inner.store.notify();
            }
        };
        let on_press_backspace_from_origin = {
            let document = Rc::downgrade(self);
            move || {
                if let Some(inner) = document.upgrade() {
                    inner.handle_backspace_from_origin(instance_number);
                }
            }
        };
        let on_press_enter = {
            let document = Rc::downgrade(self);
            move || {
                if let Some(inner) = document.upgrade() {
                    inner.handle_enter(instance_number);
                }
            }
        };
        let get_delta = move || delta.borrow().clone();

        let interface = BlockInterface::new(
            self.orchestrator.clone(),
            sheet_event_dom,
            update_delta,
            on_press_backspace_from_origin,
            on_press_enter,
            get_delta,
        );
        let block = Rc::new(Block::new(
            kind,
            instance_number,
            Rc::clone(&self.transform),
            interface,
        ));
        log::debug!("inserting {kind:?} block {instance_number}");
        self.store.append_block(Rc::clone(&block));
        Ok(block)
    }

    fn active_text_block(&self) -> Result<Option<Rc<Block>>, DocumentError> {
        let Some(block) = self.store.active_block() else {
            return Ok(None);
        };
        if !block.is_text() {
            log::warn!("block {} cannot hold text", block.instance_number());
            return Err(DocumentError::NotATextBlock {
                instance: block.instance_number(),
            });
        }
        Ok(Some(block))
    }

    fn switch_line_type_in_selection(
        &self,
        line_type: &LineType,
    ) -> Result<Option<LineType>, DocumentError> {
        let Some(block) = self.active_text_block()? else {
            return Ok(None);
        };
        let selection = block.selection();
        let transform = block.transform();
        let updated = transform.apply_line_type_to_selection(&block.delta(), selection, line_type);
        let selected_line_type = transform.get_line_type_in_selection(&updated, selection);
        block.update_delta(DeltaUpdate::new(updated));
        if let Some(sheet_event_dom) = self.sheet_event_dom() {
            sheet_event_dom.notify_selected_line_type_change(selected_line_type.clone());
        }
        Ok(Some(selected_line_type))
    }

    fn apply_text_transform_to_selection(
        &self,
        attribute_name: &str,
        attribute_value: &AttributeValue,
    ) -> Result<Option<AttributeMap>, DocumentError> {
        let Some(block) = self.active_text_block()? else {
            return Ok(None);
        };
        let selection = block.selection();
        let transform = block.transform();
        let updated = transform.apply_text_transform_to_selection(
            &block.delta(),
            selection,
            attribute_name,
            attribute_value,
        );
        let delta_attributes = transform.get_selected_text_attributes(&updated, selection);
        let cursor_attributes =
            block.set_cursor_attributes(attributes([(attribute_name, attribute_value.clone())]));
        let selected_attributes = merge_attributes_left(&delta_attributes, &cursor_attributes);
        block.update_delta(DeltaUpdate::new(updated));
        if let Some(sheet_event_dom) = self.sheet_event_dom() {
            sheet_event_dom.notify_selected_text_attributes_change(selected_attributes.clone());
        }
        Ok(Some(selected_attributes))
    }

    fn handle_backspace_from_origin(&self, instance_number: InstanceNumber) {
        if !self.config.merge_on_backspace_from_origin {
            return;
        }
        if let Some(removed) = self.store.merge_adjacent_text_blocks(instance_number) {
            self.orchestrator.release(removed.owner());
        }
    }

    fn handle_enter(self: &Rc<Self>, instance_number: InstanceNumber) {
        if !self.config.split_on_enter {
            return;
        }
        log::trace!("enter pressed in block {instance_number}");
        if let Err(err) = self.insert_block(BlockKind::Text) {
            log::error!("could not insert a block after {instance_number}: {err}");
        }
    }
}
