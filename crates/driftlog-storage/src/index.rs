//! Offset Index
//!
//! The index is the random-access half of a segment: fixed-width entries in
//! a memory-mapped file, one per record, mapping a record's offset relative
//! to the segment base onto its byte position in the store.
//!
//! Entry layout (12 bytes): `[u32_be relative_offset][u64_be position]`.
//!
//! ## Mapping lifecycle
//!
//! The mapping cannot grow while it is in use, so `open` sizes the file to
//! `max_index_bytes` up front and maps the whole range; writes are then pure
//! memory stores, and a full mapping ([`Error::IndexFull`]) is how the
//! owning segment learns it must roll. On close the ordering matters: sync
//! the mapping, sync the file, drop the mapping, and only then truncate the
//! file down to the populated prefix. After a clean close the on-disk length
//! is exactly `entries * ENTRY_WIDTH`, which is how the next open recovers
//! the entry count.
//!
//! A single mutex guards `size` and the mapping; readers take it too, so a
//! `read(-1)` racing an append always sees a consistent size snapshot.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use parking_lot::Mutex;

use crate::config::LogConfig;
use driftlog_core::{Error, Result};

/// Width of one index entry.
pub const ENTRY_WIDTH: u64 = 12;

/// Width of the relative-offset field within an entry.
const OFFSET_WIDTH: usize = 4;

/// Memory-mapped offset index backing one segment.
pub struct Index {
    path: PathBuf,
    inner: Mutex<IndexInner>,
}

struct IndexInner {
    file: File,
    /// Taken on close so the mapping is gone before the file shrinks.
    mmap: Option<MmapMut>,
    size: u64,
}

impl Index {
    /// Opens the index file, pre-sizing it to `max_index_bytes` and mapping
    /// the full range read/write shared.
    ///
    /// `size` resumes from the pre-truncate file length, which a clean close
    /// leaves at exactly `entries * ENTRY_WIDTH`.
    pub fn open(path: impl AsRef<Path>, config: &LogConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let size = file.metadata()?.len();
        file.set_len(config.max_index_bytes)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            path,
            inner: Mutex::new(IndexInner {
                file,
                mmap: Some(mmap),
                size,
            }),
        })
    }

    /// Appends one entry. [`Error::IndexFull`] signals that the mapping is
    /// exhausted and the owning segment must roll.
    pub fn write(&self, relative_offset: u32, position: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        let at = inner.size as usize;
        let mmap = inner.mmap.as_mut().ok_or(Error::Closed)?;
        if mmap.len() < at + ENTRY_WIDTH as usize {
            return Err(Error::IndexFull);
        }
        mmap[at..at + OFFSET_WIDTH].copy_from_slice(&relative_offset.to_be_bytes());
        mmap[at + OFFSET_WIDTH..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());
        inner.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Reads entry `n` as `(relative_offset, position)`; `-1` addresses the
    /// last entry.
    pub fn read(&self, n: i64) -> Result<(u32, u64)> {
        let inner = self.inner.lock();
        let mmap = inner.mmap.as_ref().ok_or(Error::Closed)?;
        if inner.size == 0 {
            return Err(Error::EntryOutOfRange(n));
        }
        let entry = if n == -1 {
            inner.size / ENTRY_WIDTH - 1
        } else if n >= 0 {
            n as u64
        } else {
            return Err(Error::EntryOutOfRange(n));
        };
        let at = entry * ENTRY_WIDTH;
        if inner.size < at + ENTRY_WIDTH {
            return Err(Error::EntryOutOfRange(n));
        }

        let at = at as usize;
        let mut relative = [0u8; OFFSET_WIDTH];
        relative.copy_from_slice(&mmap[at..at + OFFSET_WIDTH]);
        let mut position = [0u8; 8];
        position.copy_from_slice(&mmap[at + OFFSET_WIDTH..at + ENTRY_WIDTH as usize]);
        Ok((u32::from_be_bytes(relative), u64::from_be_bytes(position)))
    }

    /// Populated bytes of the mapping; `size() / ENTRY_WIDTH` is the entry
    /// count.
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Syncs the mapping and the file, unmaps, and truncates the file to the
    /// populated length so the next open sees only real entries.
    ///
    /// Idempotent; operations after close fail with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(mmap) = inner.mmap.take() {
            mmap.flush()?;
            inner.file.sync_all()?;
            drop(mmap);
            inner.file.set_len(inner.size)?;
        }
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
