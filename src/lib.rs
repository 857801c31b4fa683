#![cfg_attr(docsrs, feature(doc_cfg))]
//! # evbms_lib
//!
//! Control core of a battery management unit for a multi-cell EV pack.
//!
//! Each control cycle turns a set of raw readings into a state of charge, a
//! fault mask, an operating state and actuator commands:
//!
//! snapshot refresh → SoC → fault classification → state transition →
//! balancing → outputs
//!
//! Reading sensors and driving switches is left to implementors of
//! [`hal::Acquisition`] and [`hal::Actuation`]. [`Bms`] runs the cycle.
//!
//! ## Features
//!
//! - `default`: Enables `bin-dependencies`, which is intended for compiling the `evbms` simulation driver.
//! - `serde`: Enables `serde` support for the data structures.
//! - `simulation`: Random and scripted sensor stand-ins plus logging actuators.

/// Contains error types for the library.
mod error;

pub mod balancing;
pub mod bms;
pub mod fault;
pub mod hal;
pub mod limits;
pub mod output;
pub mod snapshot;
pub mod soc;
pub mod state;

pub use bms::{Bms, CycleReport};
pub use error::Error;
pub use fault::FaultMask;
pub use state::OperatingState;

/// Simulated collaborators for running the core without hardware.
#[cfg_attr(docsrs, doc(cfg(feature = "simulation")))]
#[cfg(feature = "simulation")]
pub mod simulation;
