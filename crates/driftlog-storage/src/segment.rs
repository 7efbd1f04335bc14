//! Segment
//!
//! A segment ties one [`Store`] and one [`Index`] together under a shared
//! base offset. It is the layer that understands records: it assigns
//! offsets, encodes records into store payloads, and turns index entries
//! back into records on read.
//!
//! Files are named after the base offset: `{base}.store` and `{base}.index`.
//! The index entry for a record holds its offset *relative* to the base, so
//! entry `i` always carries relative offset `i`: the segment recovers
//! `next_offset` at open time by reading the last entry.
//!
//! Segments move through `Active → Full → Closed → Removed`. A full segment
//! still serves reads but refuses appends with [`Error::SegmentFull`]; the
//! log reacts by rolling to a fresh segment.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use prost::Message;
use tracing::debug;

use crate::config::LogConfig;
use crate::index::{Index, ENTRY_WIDTH};
use crate::store::Store;
use driftlog_core::{Error, Record, Result};

/// One store/index pair covering a contiguous offset range.
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: LogConfig,
}

impl Segment {
    /// Opens (or creates) the segment files for `base_offset` under `dir`.
    ///
    /// `next_offset` is recovered from the index: one past the last entry's
    /// relative offset, or the base itself for an empty index.
    pub fn open(dir: &Path, base_offset: u64, config: &LogConfig) -> Result<Self> {
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(dir.join(format!("{base_offset}.index")), config)?;
        let next_offset = match index.read(-1) {
            Ok((relative, _)) => base_offset + u64::from(relative) + 1,
            Err(Error::EntryOutOfRange(_)) => base_offset,
            Err(e) => return Err(e),
        };
        debug!(base_offset, next_offset, "segment opened");
        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config: config.clone(),
        })
    }

    /// Appends `record`, stamping its offset, and returns the offset
    /// assigned. Fails with [`Error::SegmentFull`] once the segment is at
    /// capacity.
    pub fn append(&mut self, mut record: Record) -> Result<u64> {
        if self.is_maxed() {
            return Err(Error::SegmentFull(self.base_offset));
        }
        let offset = self.next_offset;
        record.offset = offset;
        let encoded = record.encode_to_vec();
        let (_, position) = self.store.append(&encoded)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;
        self.next_offset += 1;
        Ok(offset)
    }

    /// Reads the record at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let relative = offset
            .checked_sub(self.base_offset)
            .ok_or(Error::OffsetOutOfRange(offset))?;
        let (_, position) = match self.index.read(relative as i64) {
            Ok(entry) => entry,
            Err(Error::EntryOutOfRange(_)) => return Err(Error::OffsetOutOfRange(offset)),
            Err(e) => return Err(e),
        };
        let encoded = self.store.read(position)?;
        let mut record = Record::decode(encoded)?;
        record.offset = offset;
        Ok(record)
    }

    /// Whether either half of the segment has reached its configured cap.
    ///
    /// The index side asks whether one more entry still fits, so this check
    /// agrees with the mapping's real capacity even when `max_index_bytes`
    /// is not a multiple of the entry width: a segment reports full before
    /// an append could strand a store frame behind a failed index write.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() + ENTRY_WIDTH > self.config.max_index_bytes
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// The offset the next append will be assigned.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// `{base}-{next}`: the offset range this segment covers.
    pub fn name(&self) -> String {
        format!("{}-{}", self.base_offset, self.next_offset)
    }

    /// Handle on the raw store, for the log-wide sequential reader.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Closes index and store. Both are attempted; the first error wins.
    pub fn close(&mut self) -> Result<()> {
        let index = self.index.close();
        let store = self.store.close();
        index.and(store)
    }

    /// Closes the segment and unlinks both files.
    pub fn remove(&mut self) -> Result<()> {
        debug!(segment = %self.name(), "removing segment");
        self.close()?;
        fs::remove_file(self.index.path())?;
        fs::remove_file(self.store.path())?;
        Ok(())
    }
}
