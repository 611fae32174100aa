//! Per-frame uniform storage.
//!
//! [`UniformRing`] keeps a fixed number of identical uniform buffers so that a
//! frame can bind one slot while the device may still be reading the slot of
//! an earlier frame.

mod ring;

pub use ring::UniformRing;
