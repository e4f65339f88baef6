//! # maxbridge-domain
//!
//! Pure domain model for the MAX! to accessory bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (the hub's view of a MAX! child device)
//! - Define the **accessory model** (categories, services, characteristics,
//!   characteristic values and property overrides)
//! - Map raw device state onto exposed heating/cooling states
//! - Define **Events** (pushed characteristic values, delivered commands)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod accessory;
pub mod characteristic;
pub mod device;
pub mod event;
pub mod heating;
