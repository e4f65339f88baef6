//! # maxbridge-adapter-virtual
//!
//! An in-memory MAX! Cube for testing and demonstration. It implements the
//! hub ports of `maxbridge-app`, so the bridge runs against it exactly as it
//! would against real hardware.
//!
//! ## Behaviour
//!
//! | Operation | Simulation |
//! |-----------|------------|
//! | `connect` | Loads the configured devices; the first `connect_timeouts` attempts time out |
//! | `refresh` | Moves every actual temperature one `drift_step` towards its target |
//! | `set_target_temperature` | Updates the target of the addressed device |
//! | any command | Every `timeout_every`-th command times out |
//!
//! ## Dependency rule
//!
//! Depends on `maxbridge-app` (port traits) and `maxbridge-domain` only.

mod config;
mod cube;

pub use config::{VirtualCubeConfig, VirtualDeviceConfig};
pub use cube::{VirtualCube, VirtualCubeClient};
