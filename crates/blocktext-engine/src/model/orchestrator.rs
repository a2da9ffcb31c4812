use std::rc::Rc;

use crate::delta::DeltaUpdate;
use crate::events::{Endpoint, OwnerId};

use super::block::InstanceNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockControllerEventKind {
    DeltaUpdate,
}

/// Event addressed by the document to the controller of one block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockControllerEvent {
    DeltaUpdate(DeltaUpdate),
}

impl BlockControllerEvent {
    pub fn kind(&self) -> BlockControllerEventKind {
        match self {
            BlockControllerEvent::DeltaUpdate(_) => BlockControllerEventKind::DeltaUpdate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ControllerAddress {
    instance_number: InstanceNumber,
    kind: BlockControllerEventKind,
}

/// Routes document events to block controllers by instance number.
///
/// Cloning yields another handle to the same routing table.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    endpoint: Rc<Endpoint<ControllerAddress, BlockControllerEvent>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block_controller_listener(
        &self,
        owner: OwnerId,
        instance_number: InstanceNumber,
        kind: BlockControllerEventKind,
        listener: impl Fn(&BlockControllerEvent) + 'static,
    ) {
        let address = ControllerAddress {
            instance_number,
            kind,
        };
        self.endpoint.subscribe(owner, address, listener);
    }

    pub fn emit_to_block_controller(
        &self,
        instance_number: InstanceNumber,
        event: BlockControllerEvent,
    ) {
        let address = ControllerAddress {
            instance_number,
            kind: event.kind(),
        };
        self.endpoint.publish(&address, &event);
    }

    pub fn listener_count(
        &self,
        instance_number: InstanceNumber,
        kind: BlockControllerEventKind,
    ) -> usize {
        self.endpoint.listener_count(&ControllerAddress {
            instance_number,
            kind,
        })
    }

    /// Drop the controller subscriptions of one owner.
    pub fn release(&self, owner: OwnerId) {
        self.endpoint.release(owner);
    }

    /// Drop every controller subscription.
    pub fn release_all(&self) {
        self.endpoint.release_all();
    }
}
