//! State module for tracking listing traversal progress
//!
//! # Components
//!
//! - `TraversalPhase`: where a listing is in the expand/extract state machine
//! - `StopReason`: which condition ended the expand loop

mod phase;

// Re-export main types
pub use phase::{StopReason, TraversalPhase};
