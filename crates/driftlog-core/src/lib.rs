//! Shared types for the driftlog commit log.
//!
//! This crate holds the two things every other driftlog crate agrees on:
//!
//! - [`Record`]: the unit of data the log stores: an opaque byte payload
//!   plus the offset the log assigned to it.
//! - [`Error`]/[`Result`]: the error taxonomy shared by the storage engine
//!   and the HTTP layer.
//!
//! The engine itself lives in `driftlog-storage`; the HTTP API in
//! `driftlog-server`.

pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::Record;
