//! Parser for the long listing printed by `ldms_ls -l`.
//!
//! The listing has an optional metadata section (a table of every set's
//! schema, instance, sizes and ownership, fenced by a header row and a
//! `====` rule) followed by one block per set: a `NAME: ... last update: TS`
//! header and one row per metric.
//!
//! ```
//! let text = "node-1/meminfo: consistent, last update: Mon Jan  1 00:00:00 2024 [1us]\n\
//!             D u64        MemTotal                 16333364\n\
//!             D f32[]      loadavg                  0.5,0.25,0.125 load\n";
//!
//! let sets = ldmstest_ls::parse(text).unwrap();
//! let set = &sets["node-1/meminfo"];
//! assert_eq!(set.data["MemTotal"].as_u64(), Some(16333364));
//! assert_eq!(set.data_type["loadavg"].to_string(), "f32[]");
//! ```

pub mod decoder;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod record;

pub use decoder::{decode, parse_int, BaseType, MetricValue, TypeTag};
pub use error::{DecodeError, LsError, LsResult};
pub use grammar::{LineGrammar, LineKind, MetaRow, MetricRow, Summary};
pub use parser::{parse, LsParser, LsSets};
pub use record::{Metadata, SetRecord};
