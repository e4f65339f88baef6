//! # maxbridge-app
//!
//! Application layer: the device-to-accessory synchronization engine and
//! the **port definitions** (traits) it drives.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `HubConnector` / `HubClient`: connect to the hub, list devices,
//!     refresh, send commands (all blocking)
//!   - `EventPublisher`: publish domain events to observers
//! - Provide the runtime primitives the engine is built on: running
//!   blocking hub I/O off the scheduler and a cancellable stop signal
//! - Adapt each discovered thermostat into an accessory with a
//!   characteristic table (`Thermostat`)
//! - Deliver user writes to the hub with retry and per-device supersession
//!   (`CommandDispatcher`)
//! - Own discovery and the periodic refresh loop (`Bridge`)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `maxbridge-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod accessory;
pub mod bridge;
pub mod command;
pub mod event_bus;
pub mod ports;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_support;
