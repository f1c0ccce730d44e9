//! # Radar Strategy Library
//!
//! Indicator math, snapshot construction and the threshold-rule evaluators.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no network, no files. The crate depends only on
//!   `core-types` and `configuration`; fetched data comes in as `Candle`s and
//!   scalars, recommendations go out as `Signal`s.
//! - **Configuration is injected:** every threshold reaches the evaluator
//!   through `create_evaluator`, never through globals.
//! - **Never fails once a snapshot exists:** the only error path is building
//!   the snapshot (`StrategyError::InsufficientData`); evaluation is total.
//!
//! ## Public API
//!
//! - `SnapshotBuilder` / `AuxiliaryInputs`: candles plus scraped scalars into a `MarketSnapshot`.
//! - `SignalEvaluator` and `evaluate`: a `MarketSnapshot` into exactly one `Signal`.
//! - `create_evaluator`: the factory wiring class profiles and rule thresholds.
//! - `evaluate_memory`: the memory-sector variant.
//! - `settlement`: the monthly futures settlement calendar.

pub mod error;
pub mod evaluator;
pub mod factory;
pub mod indicators;
pub mod memory;
pub mod settlement;
pub mod snapshot;

pub use error::StrategyError;
pub use evaluator::{SignalEvaluator, evaluate};
pub use factory::create_evaluator;
pub use memory::{MemoryAverages, evaluate_memory, memory_averages};
pub use snapshot::{AuxiliaryInputs, SnapshotBuilder};
