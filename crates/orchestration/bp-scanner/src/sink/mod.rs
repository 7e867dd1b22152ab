//! Reporting sinks for found buckets.
//!
//! - [`ConsoleSink`] - coloured `Bucket: R/W name` lines
//! - [`CsvSink`] - `name,region,listable,writable` records
//! - [`FanoutSink`] - several sinks at once
//! - [`CollectingSink`] - keeps everything in memory

mod collect;
mod console;
mod csv;
mod fanout;

pub use collect::CollectingSink;
pub use self::console::ConsoleSink;
pub use self::csv::CsvSink;
pub use fanout::FanoutSink;
