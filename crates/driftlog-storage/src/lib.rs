//! driftlog Storage Engine
//!
//! A persistent, append-only, segmented commit log. Producers append records
//! and receive the offset assigned; consumers read records back by offset.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Log                                          │
//! │  - routes appends to the active segment      │
//! │  - routes reads by offset range              │
//! │  - rolls segments, truncates, recovers       │
//! │ ┌──────────────┐  ┌──────────────┐           │
//! │ │ Segment 0    │  │ Segment N    │  (active) │
//! │ │ ┌──────────┐ │  │ ┌──────────┐ │           │
//! │ │ │ Store    │ │  │ │ Store    │ │           │
//! │ │ │ Index    │ │  │ │ Index    │ │           │
//! │ │ └──────────┘ │  │ └──────────┘ │           │
//! │ └──────────────┘  └──────────────┘           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Append flow: `Log` → active `Segment` → assign offset → encode record →
//! `Store::append` returns the file position → `Index::write` maps the
//! relative offset to that position.
//!
//! Read flow: `Log` → locate segment by offset range → `Index::read` →
//! `Store::read` → decode → `Record`.
//!
//! ## On-disk layout
//!
//! Per segment with base offset `B` under the log directory:
//!
//! - `{B}.store`: sequence of `[u64_be length][payload]` framed records
//! - `{B}.index`: 12-byte entries `[u32_be relative_offset][u64_be position]`,
//!   zero-padded to `max_index_bytes` while open, truncated to the populated
//!   prefix on clean close
//!
//! ## Durability
//!
//! Store writes go through a buffered writer and are flushed on read and on
//! close; there is no per-append fsync. Index writes land in a shared
//! memory mapping that is synced on close. Durability is bounded by buffer
//! flush plus OS page cache behavior.
//!
//! ## Concurrency
//!
//! [`Log`] takes a reader-writer lock over its segment list; [`Store`] and
//! [`Index`] each serialize their own state behind a mutex. The whole engine
//! is `Send + Sync` and meant to be shared behind an `Arc`.

pub mod config;
pub mod index;
pub mod log;
pub mod segment;
pub mod store;

pub use config::LogConfig;
pub use index::Index;
pub use log::{Log, LogReader};
pub use segment::Segment;
pub use store::Store;

pub use driftlog_core::{Error, Record, Result};
