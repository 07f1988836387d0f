//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod clock;

pub use clock::{FixedTimeSource, SystemTimeSource};
