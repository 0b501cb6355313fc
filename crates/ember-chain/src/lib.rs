//! Chain management for Ember.
//!
//! The [`ChainManager`] owns the block tree: it ingests blocks, parks
//! and later promotes orphans, picks the heaviest chain by cumulative
//! difficulty, reorganizes the mainchain index, and answers the node's
//! query surface.

pub mod manager;

pub use manager::{ChainManager, Clock};
