//! Gridframe Core - in-memory typed columns and tables
//!
//! This crate provides:
//! - Columns: typed, missing-aware storage with a dynamic `Column` interface
//! - Tables: equal-length named columns addressed by row
//! - Pipelines: apply and filter over columns and tables, in place or copying
//! - Search: partitioned range and equality search on ordered columns
//! - Interpolation: filling missing runs in numeric columns
//! - Conversion and CSV import/export at the edges
//!
//! Every operation that touches shared data takes a `ReadAccess` or
//! `WriteAccess`, which either acquires the data's lock or carries a borrow
//! proving the caller already holds it.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cooperative cancellation
pub mod cancel;

/// Column trait and the built-in column variants
pub mod column;

/// Per-call option types and TOML configuration
pub mod config;

/// Column conversion with per-row errors
pub mod convert;

/// Error types
pub mod error;

/// Missing-run interpolation
pub mod interpolate;

/// CSV import and export
pub mod io;

/// Lock handles and access selectors
pub mod lock;

/// Worker-pool sizing for partitioned operations
pub mod parallel;

/// Apply and filter pipelines
pub mod pipeline;

/// Inclusive row ranges with open ends
pub mod range;

/// Row views and row input
pub mod row;

/// Partitioned search
pub mod search;

/// Tables of named columns
pub mod table;

/// Dynamic cell values
pub mod value;

pub use cancel::CancellationToken;
pub use column::{
    Column, ComplexColumn, Float64Column, GenericColumn, Int64Column, MixedColumn,
    OrderedColumn, OrderedGenericColumn, SortOrder, StringColumn, TimeColumn, TypedColumn,
};
pub use config::{CsvOptions, EngineConfig, InterpolateOptions, SearchOptions};
pub use error::{DataError, DataResult, ErrorCollection};
pub use interpolate::{Axis, Direction, Region, Strategy};
pub use lock::{ReadAccess, Shared, WriteAccess};
pub use parallel::ParallelConfig;
pub use pipeline::{FilterAction, Frame};
pub use range::Range;
pub use row::{ColumnKey, Row, RowValues};
pub use table::{SortKey, Table};
pub use value::{ColumnType, Value};
