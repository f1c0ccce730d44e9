pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{InstrumentClass, MemoryAction, MemoryFocus, NewsSentiment, SignalAction, SpotTrend};
pub use error::CoreError;
pub use structs::{Candle, MarketSnapshot, MemorySignal, Signal, SpotBoard, SpotQuote};
