//! Shared utilities for the diamond resolver.
//!
//! This crate provides the cross-cutting error type used by all other
//! diamond crates.

pub mod errors;
