//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the synchronization engine and the
//! outside world: the hub on one side, observers of the exposed
//! accessories on the other.

pub mod event_bus;
pub mod hub;

pub use event_bus::EventPublisher;
pub use hub::{HubClient, HubConnector, SharedDevice};
