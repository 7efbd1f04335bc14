//! Record Store
//!
//! The store is the write-optimized half of a segment: an append-only file
//! of length-prefixed records. Every entry is `[u64_be length][payload]`;
//! the position of the length prefix is what the index remembers.
//!
//! Appends go through a buffered writer so a burst of small records costs
//! one syscall, not one per record. The flip side is a visibility rule:
//! every read path flushes the buffer before touching the file, so a record
//! that was just appended is always readable.
//!
//! A single mutex guards the writer and the logical size. The position
//! reported by [`Store::append`] is captured under that lock, so concurrent
//! appenders each get the position their own record landed at.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use driftlog_core::Result;

/// Width of the big-endian length prefix framing every record.
pub const LEN_WIDTH: u64 = 8;

/// Append-only record file backing one segment.
pub struct Store {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    buf: BufWriter<File>,
    size: u64,
}

impl Store {
    /// Opens (or creates) the store file and resumes `size` from its current
    /// length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            inner: Mutex::new(StoreInner {
                buf: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Appends `payload` framed by its length prefix.
    ///
    /// Returns `(bytes_written, position)` where `position` is the byte
    /// offset of the length prefix and `bytes_written` includes it.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();
        let position = inner.size;
        inner.buf.write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.buf.write_all(payload)?;
        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Reads the record whose length prefix begins at `position`.
    ///
    /// The write buffer is flushed first so an appended-but-unflushed record
    /// is visible.
    pub fn read(&self, position: u64) -> Result<Bytes> {
        let mut inner = self.inner.lock();
        inner.buf.flush()?;
        let file = inner.buf.get_ref();
        let mut len = [0u8; LEN_WIDTH as usize];
        file.read_exact_at(&mut len, position)?;
        let mut payload = vec![0u8; u64::from_be_bytes(len) as usize];
        file.read_exact_at(&mut payload, position + LEN_WIDTH)?;
        Ok(Bytes::from(payload))
    }

    /// Raw positional read of up to `buf.len()` bytes at `offset`, flushing
    /// the write buffer first. Used by the log-wide sequential reader.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.buf.flush()?;
        Ok(inner.buf.get_ref().read_at(buf, offset)?)
    }

    /// Logical size in bytes: the sum of all framed appends, including any
    /// still sitting in the write buffer.
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Flushes buffered writes down to the OS. The descriptor itself is
    /// released when the store drops.
    pub fn close(&self) -> Result<()> {
        self.inner.lock().buf.flush()?;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_read() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (written, position) = store.append(b"hello world").unwrap();
        assert_eq!(written, LEN_WIDTH + 11);
        assert_eq!(position, 0);
        assert_eq!(store.size(), written);

        let payload = store.read(position).unwrap();
        assert_eq!(payload, Bytes::from("hello world"));
    }

    #[test]
    fn test_positions_are_contiguous() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let mut expected = 0;
        for i in 0..10u32 {
            let payload = format!("record-{i}");
            let (written, position) = store.append(payload.as_bytes()).unwrap();
            assert_eq!(position, expected);
            assert_eq!(written, LEN_WIDTH + payload.len() as u64);
            expected += written;
        }
        assert_eq!(store.size(), expected);
    }

    #[test]
    fn test_empty_payload() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (written, position) = store.append(b"").unwrap();
        assert_eq!(written, LEN_WIDTH);
        assert_eq!(store.read(position).unwrap(), Bytes::new());
    }

    #[test]
    fn test_read_at() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(b"abc").unwrap();

        let mut len = [0u8; LEN_WIDTH as usize];
        let n = store.read_at(&mut len, 0).unwrap();
        assert_eq!(n, LEN_WIDTH as usize);
        assert_eq!(u64::from_be_bytes(len), 3);

        let mut payload = [0u8; 3];
        store.read_at(&mut payload, LEN_WIDTH).unwrap();
        assert_eq!(&payload, b"abc");
    }

    #[test]
    fn test_size_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.store");

        let store = Store::open(&path).unwrap();
        let (_, first) = store.append(b"one").unwrap();
        let (_, second) = store.append(b"two").unwrap();
        let size = store.size();
        store.close().unwrap();
        drop(store);

        let store = Store::open(&path).unwrap();
        assert_eq!(store.size(), size);
        assert_eq!(store.read(first).unwrap(), Bytes::from("one"));
        assert_eq!(store.read(second).unwrap(), Bytes::from("two"));

        // appends resume at the recovered size
        let (_, position) = store.append(b"three").unwrap();
        assert_eq!(position, size);
    }

    #[test]
    fn test_read_sees_unflushed_append() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        // no flush or close between append and read
        let (_, position) = store.append(b"buffered").unwrap();
        assert_eq!(store.read(position).unwrap(), Bytes::from("buffered"));
    }
}
