//! LDMS test harness common core types.

pub mod error;

pub use error::{Classify, Error, ErrorKind, Result};
