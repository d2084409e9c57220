//! Utility Module
//!
//! - [`time`]: frame timing ([`Timer`], and [`FrameClock`] which turns a
//!   configured [`FrameStep`](crate::config::FrameStep) into per-frame steps)

pub mod time;

pub use time::{FrameClock, Timer};
