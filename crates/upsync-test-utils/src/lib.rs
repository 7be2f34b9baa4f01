//! Shared test utilities for the upsync workspace.
//!
//! This crate provides standardised two-tree fixtures so every suite builds
//! upstream and local trees the same way. It is a dev-dependency only and
//! never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TreePair`] builder for upstream/local scenarios

pub mod tree;

pub use tree::{TreePair, write_file};
