//! Async value streams over tokio byte transports.
//!
//! Encoded values are self-delimiting, so a stream is simply values written
//! back to back with no extra framing.

pub mod reader;
pub mod writer;

pub use reader::ValueReader;
pub use writer::ValueWriter;
