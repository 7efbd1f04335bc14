//! Error Types for driftlog
//!
//! Everything the engine can fail with is collected in one [`enum@Error`] so
//! the storage crate and the HTTP layer agree on a single taxonomy.
//!
//! ## Error Categories
//!
//! ### Recoverable
//! - `OffsetOutOfRange`: a read past the ends of the log. The only variant a
//!   caller is expected to handle: it marks an absent record, not a fault.
//!
//! ### Rollover signals
//! - `SegmentFull` / `IndexFull`: a segment (or its index mapping) is at
//!   capacity. The log consumes these internally by rolling to a new
//!   segment; they only escape when a segment or a bare index is driven
//!   directly.
//!
//! ### Faults
//! - `Io`: an underlying filesystem or mmap operation failed.
//! - `Decode`: bytes read back from a store did not decode as a record.
//! - `Closed`: an operation reached a segment that was already closed.
//!
//! ## Usage
//! All fallible functions return [`Result<T>`], aliased over this error, so
//! `?` propagation works throughout.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested offset is below the lowest or above the highest record.
    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    /// Index entry number is not populated.
    #[error("index entry out of range: {0}")]
    EntryOutOfRange(i64),

    /// The index mapping is exhausted; the owning segment must roll.
    #[error("index full")]
    IndexFull,

    /// Append refused because the segment is at capacity.
    #[error("segment full: base offset {0}")]
    SegmentFull(u64),

    /// Operation on a segment that has already been closed.
    #[error("segment closed")]
    Closed,

    #[error("record decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}
