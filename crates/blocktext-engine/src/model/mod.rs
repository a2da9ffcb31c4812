//! Documents, their blocks, and the wiring between them and the host.
//!
//! A [`Document`] owns a [`Store`] of [`Block`]s and an [`Orchestrator`]
//! through which it addresses block controllers. The host plugs in as a
//! [`Consumer`]: it receives store snapshots and sends requests through its
//! [`SheetEventDomain`](crate::events::SheetEventDomain).

pub mod block;
pub mod document;
pub mod orchestrator;
pub mod store;

pub use block::{Block, BlockInterface, BlockKind, InstanceNumber};
pub use document::{Consumer, Document, DocumentError};
pub use orchestrator::{BlockControllerEvent, BlockControllerEventKind, Orchestrator};
pub use store::{BlockEntry, Store, StoreState};
