//! Event plumbing shared by the document, its blocks and the host.

pub mod endpoint;
pub mod owner;
pub mod sheet;

pub use endpoint::Endpoint;
pub use owner::OwnerId;
pub use sheet::{SheetEvent, SheetEventDomain, SheetEventType};
