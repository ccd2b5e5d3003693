//! Core data types for the diamond resolver.
//!
//! This crate defines the value types shared by the resolver and its
//! verification oracle: comparable versions and ranges, library identities,
//! the package metadata tree, and resolver configuration.
//!
//! Nothing here performs I/O beyond reading the config file.

pub mod config;
pub mod library;
pub mod metadata;
pub mod version;
