//! The Log
//!
//! The log manages an ordered collection of segments under one directory.
//! Appends go to the active segment (always the last one) and roll it onto
//! a fresh segment when it fills; reads locate the owning segment by offset
//! range.
//!
//! ## Recovery
//!
//! Opening a log scans its directory for segment files. Each segment leaves
//! two files with the same numeric stem (`{base}.store`, `{base}.index`), so
//! the scan collects stems into a set: duplicates collapse and non-numeric
//! names are silently ignored. Segments are reopened in ascending base
//! order, each recovering its own `next_offset` from its index. An empty
//! directory gets one segment at `initial_offset`.
//!
//! ## Locking
//!
//! One reader-writer lock guards the segment list: `append`, `truncate`,
//! `close`, `remove` and `reset` take it exclusively; `read`, the offset
//! accessors and `reader` take it shared. Store and index serialize their
//! own state independently, so concurrent reads at different offsets only
//! contend inside a single segment's files.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::LogConfig;
use crate::segment::Segment;
use crate::store::Store;
use driftlog_core::{Error, Record, Result};

/// A segmented, append-only commit log rooted at one directory.
///
/// `Log` is `Send + Sync`; share it behind an [`Arc`] and call everything
/// through `&self`.
pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Opens the log at `dir`, creating the directory if needed and
    /// recovering any segments already on disk.
    ///
    /// Zero values in `config` fall back to the defaults, so an all-zero
    /// config is usable.
    pub fn open(dir: impl AsRef<Path>, mut config: LogConfig) -> Result<Self> {
        let defaults = LogConfig::default();
        if config.max_store_bytes == 0 {
            config.max_store_bytes = defaults.max_store_bytes;
        }
        if config.max_index_bytes == 0 {
            config.max_index_bytes = defaults.max_index_bytes;
        }

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let log = Self {
            dir,
            config,
            segments: RwLock::new(Vec::new()),
        };
        log.setup()?;
        Ok(log)
    }

    /// Scans the directory and (re)builds the segment list.
    fn setup(&self) -> Result<()> {
        let mut base_offsets = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // store and index files share a stem; anything non-numeric is
            // not ours and is skipped
            if let Ok(base) = stem.parse::<u64>() {
                base_offsets.insert(base);
            }
        }

        let mut segments = self.segments.write();
        for &base in &base_offsets {
            segments.push(Segment::open(&self.dir, base, &self.config)?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                &self.dir,
                self.config.initial_offset,
                &self.config,
            )?);
        }
        info!(
            dir = %self.dir.display(),
            segments = segments.len(),
            next_offset = segments[segments.len() - 1].next_offset(),
            "log opened"
        );
        Ok(())
    }

    /// Appends `record` to the active segment and returns the offset it was
    /// assigned. Rollover is transparent: a full active segment is replaced
    /// before or after the append as needed.
    pub fn append(&self, record: Record) -> Result<u64> {
        let mut segments = self.segments.write();

        // a segment recovered from disk can already be at capacity
        if segments
            .last()
            .map(Segment::is_maxed)
            .unwrap_or_default()
        {
            let base = segments[segments.len() - 1].next_offset();
            Self::roll(&self.dir, &self.config, &mut segments, base)?;
        }

        let active = segments.len() - 1;
        let offset = segments[active].append(record)?;
        if segments[active].is_maxed() {
            Self::roll(&self.dir, &self.config, &mut segments, offset + 1)?;
        }
        Ok(offset)
    }

    fn roll(
        dir: &Path,
        config: &LogConfig,
        segments: &mut Vec<Segment>,
        base: u64,
    ) -> Result<()> {
        debug!(base, "rolling to new segment");
        segments.push(Segment::open(dir, base, config)?);
        Ok(())
    }

    /// Reads the record at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read();
        let segment = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
            .ok_or(Error::OffsetOutOfRange(offset))?;
        segment.read(offset)
    }

    /// Base offset of the oldest segment.
    pub fn lowest_offset(&self) -> u64 {
        let segments = self.segments.read();
        segments.first().map(Segment::base_offset).unwrap_or(0)
    }

    /// Offset of the newest record, or 0 if nothing was ever appended.
    pub fn highest_offset(&self) -> u64 {
        let segments = self.segments.read();
        match segments.last().map(Segment::next_offset).unwrap_or(0) {
            0 => 0,
            next => next - 1,
        }
    }

    /// Removes every segment whose records all sit at or below `lowest`.
    /// Segments straddling the watermark are kept whole.
    ///
    /// If the watermark swallows every segment, a fresh one is created at
    /// `lowest + 1` so the log stays usable.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write();

        // partition first and commit the surviving list before any fallible
        // removal, so a failed unlink cannot drop segments meant to survive
        let mut kept = Vec::with_capacity(segments.len());
        let mut removed = Vec::new();
        for segment in segments.drain(..) {
            if segment.next_offset() <= lowest + 1 {
                removed.push(segment);
            } else {
                kept.push(segment);
            }
        }
        *segments = kept;
        if segments.is_empty() {
            segments.push(Segment::open(&self.dir, lowest + 1, &self.config)?);
        }

        for mut segment in removed {
            info!(segment = %segment.name(), lowest, "truncating segment");
            segment.remove()?;
        }
        Ok(())
    }

    /// A sequential reader over the raw store bytes of every segment, oldest
    /// first. Write buffers are flushed as the reader progresses, so it
    /// observes every record appended before the read call.
    pub fn reader(&self) -> LogReader {
        let segments = self.segments.read();
        LogReader {
            stores: segments.iter().map(Segment::store).collect(),
            current: 0,
            position: 0,
        }
    }

    /// Closes every segment: store buffers flush, index files shrink to
    /// their populated length.
    pub fn close(&self) -> Result<()> {
        let mut segments = self.segments.write();
        for segment in segments.iter_mut() {
            segment.close()?;
        }
        Ok(())
    }

    /// Closes the log and deletes its directory.
    pub fn remove(&self) -> Result<()> {
        self.close()?;
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Deletes everything and reopens the log empty, same directory and
    /// configuration.
    pub fn reset(&self) -> Result<()> {
        self.remove()?;
        self.segments.write().clear();
        fs::create_dir_all(&self.dir)?;
        self.setup()
    }
}

/// Concatenating [`Read`] over the store files of a log, oldest segment
/// first, yielding the raw framed bytes.
///
/// The reader holds its own per-segment position, so it is unaffected by
/// appends that happen while it is being consumed: it simply reads up to
/// whatever each store holds at the time of each call.
pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,
    position: u64,
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.current < self.stores.len() {
            let n = self.stores[self.current]
                .read_at(buf, self.position)
                .map_err(|e| match e {
                    Error::Io(io) => io,
                    other => std::io::Error::other(other),
                })?;
            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }
            self.current += 1;
            self.position = 0;
        }
        Ok(0)
    }
}
