//! Platform abstraction layer
//!
//! Browser/native differences the simulation should not see:
//! - Frame timing from host timestamps
//! - Pointer coordinates and event throttling

pub mod input;
pub mod time;

pub use input::{PointerThrottle, normalize_pointer};
pub use time::FrameClock;
