//! Configuration types for the LDMS test harness.
//!
//! This crate provides the configuration used by test drivers for
//! `.ldmstest/config.yaml` files, the common command-line knobs of every
//! cluster test (cluster name, OVIS prefix, TADA server, extra mounts) and
//! lookups against an OVIS installation prefix.

pub mod env;
pub mod loader;
pub mod ovis;
pub mod types;

pub use env::*;
pub use loader::*;
pub use ovis::*;
pub use types::*;
