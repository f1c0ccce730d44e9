//! # Radar Report
//!
//! Turns evaluated instruments into the text pushed to the chat channel, and
//! into terminal tables for dry runs.
//!
//! Rendering never fails: instruments that could not be evaluated are kept in
//! the report as `InsufficientData` or `Failed` entries and rendered as a
//! one-line notice.

pub mod memory;
pub mod radar;
pub mod table;

pub use memory::{MemoryEntry, MemoryReport, MemoryStockReport};
pub use radar::{InstrumentReport, MaWindows, RadarReport, ReportEntry};
pub use table::{memory_table, summary_table};
