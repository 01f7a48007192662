//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `Reading.timestamp` is UTC, assigned at ingestion time
//! - The store stamps it at append unless an inbound channel asserted its own
//!   receipt time (the MQTT adapter does); both mean "time of ingestion"

mod blueprint;
mod error;
mod reading;
mod sink;
mod store;

pub use blueprint::*;
pub use error::*;
pub use reading::*;
pub use sink::*;
pub use store::*;
