//! Integration and adversarial test suite for Ember.
//!
//! This crate exercises the chain manager end to end: block ingestion,
//! orphan promotion, fork choice, reorganization, and persistence, with
//! adversarial inputs attempting to break consensus invariants.

pub mod helpers;
