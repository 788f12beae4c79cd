use std::io::{Read, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use argus_paths::{ContentPath, PathType};
use argus_store::ObjectStore;
use md5::Md5;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{SparseError, SparseResult};
use crate::index::{RangeReader, SparseRange};

/// Copy chunk size for the range pass.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Outcome of one sparse write.
#[derive(Clone, Debug)]
pub struct SparseWriteResult {
    /// Sum of all range lengths, sparse extents included.
    pub logical_size: u64,
    /// Bytes physically written to the backing object.
    pub stored_size: u64,
    /// Hex SHA-256 over exactly the physically written bytes.
    pub sha256: String,
    /// Hex MD5 over exactly the physically written bytes.
    pub md5: String,
    /// Whether a side-car index was persisted.
    pub index_written: bool,
}

/// Write a range-aware source into the store at `path`, compacting out
/// sparse extents.
///
/// Non-sparse ranges are copied back to back; the side-car index is
/// written iff at least one sparse range was seen, so dense sources
/// incur no overhead. A source whose `ranges()` comes back empty cannot
/// describe its extents and is copied densely from offset zero.
///
/// `cancel` is checked between chunks; cancellation returns
/// [`SparseError::Cancelled`] and leaves already-written bytes in place.
pub fn write_sparse(
    store: &dyn ObjectStore,
    path: &ContentPath,
    source: &mut dyn RangeReader,
    cancel: &AtomicBool,
) -> SparseResult<SparseWriteResult> {
    let mut sha256 = Sha256::new();
    let mut md5 = Md5::new();

    let mut sink = store.writer(path)?;
    // A sparse write replaces the object, never appends to it.
    sink.truncate()?;

    let ranges = source.ranges();
    if ranges.is_empty() {
        // The source cannot describe extents: copy the whole stream.
        source.seek(SeekFrom::Start(0))?;
        let written = copy_chunks(
            &mut *source,
            &mut *sink,
            None,
            &mut sha256,
            &mut md5,
            cancel,
            0,
        )?;
        return Ok(SparseWriteResult {
            logical_size: written,
            stored_size: written,
            sha256: hex::encode(sha256.finalize()),
            md5: hex::encode(md5.finalize()),
            index_written: false,
        });
    }

    // Build the descriptor list up front; file offsets accumulate over
    // the stored (non-sparse) bytes only.
    let mut index = Vec::with_capacity(ranges.len());
    let mut logical_size = 0u64;
    let mut stored_size = 0u64;
    let mut saw_sparse = false;
    for range in &ranges {
        let file_length = if range.is_sparse { 0 } else { range.length };
        index.push(SparseRange {
            file_offset: stored_size,
            original_offset: range.offset,
            length: range.length,
            file_length,
        });
        logical_size += range.length;
        stored_size += file_length;
        saw_sparse |= range.is_sparse;
    }

    let mut written = 0u64;
    for range in &ranges {
        if range.is_sparse {
            continue;
        }
        source.seek(SeekFrom::Start(range.offset))?;
        written += copy_chunks(
            &mut *source,
            &mut *sink,
            Some(range.length),
            &mut sha256,
            &mut md5,
            cancel,
            written,
        )?;
    }
    sink.flush().map_err(SparseError::Io)?;

    let index_written = saw_sparse;
    if index_written {
        let index_path = path.set_type(PathType::ContentSparseIndex);
        debug!(path = %index_path.as_physical_path(), ranges = index.len(), "writing sparse index");
        let mut index_sink = store.writer(&index_path)?;
        index_sink.truncate()?;
        let data = serde_json::to_vec_pretty(&index)
            .map_err(|e| SparseError::MalformedIndex(e.to_string()))?;
        index_sink.write_all(&data).map_err(SparseError::Io)?;
        index_sink.flush().map_err(SparseError::Io)?;
    }

    Ok(SparseWriteResult {
        logical_size,
        stored_size,
        sha256: hex::encode(sha256.finalize()),
        md5: hex::encode(md5.finalize()),
        index_written,
    })
}

/// Copy up to `limit` bytes (or to EOF when `None`) in fixed chunks,
/// feeding both digests. Returns the number of bytes copied.
fn copy_chunks<R: Read + ?Sized, W: Write + ?Sized>(
    source: &mut R,
    sink: &mut W,
    limit: Option<u64>,
    sha256: &mut Sha256,
    md5: &mut Md5,
    cancel: &AtomicBool,
    already_written: u64,
) -> SparseResult<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(SparseError::Cancelled {
                written: already_written + copied,
            });
        }
        let want = match limit {
            Some(limit) => {
                let remaining = limit - copied;
                if remaining == 0 {
                    break;
                }
                remaining.min(CHUNK_SIZE as u64) as usize
            }
            None => CHUNK_SIZE,
        };
        let n = source.read(&mut buf[..want])?;
        if n == 0 {
            if let Some(limit) = limit {
                return Err(SparseError::ShortRead {
                    expected: limit,
                    got: copied,
                });
            }
            break;
        }
        sink.write_all(&buf[..n])?;
        sha256.update(&buf[..n]);
        md5.update(&buf[..n]);
        copied += n as u64;
    }
    Ok(copied)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::index::SourceRange;
    use argus_store::MemoryStore;
    use std::io::{self, Cursor, Seek};

    pub(crate) struct FakeRangedSource {
        data: Cursor<Vec<u8>>,
        ranges: Vec<SourceRange>,
    }

    impl FakeRangedSource {
        pub(crate) fn new(data: &[u8], ranges: Vec<SourceRange>) -> Self {
            Self {
                data: Cursor::new(data.to_vec()),
                ranges,
            }
        }
    }

    impl Read for FakeRangedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.data.read(buf)
        }
    }

    impl Seek for FakeRangedSource {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.data.seek(pos)
        }
    }

    impl RangeReader for FakeRangedSource {
        fn ranges(&self) -> Vec<SourceRange> {
            self.ranges.clone()
        }
    }

    fn dense(offset: u64, length: u64) -> SourceRange {
        SourceRange {
            offset,
            length,
            is_sparse: false,
        }
    }

    fn sparse(offset: u64, length: u64) -> SourceRange {
        SourceRange {
            offset,
            length,
            is_sparse: true,
        }
    }

    pub(crate) fn hello_world_source() -> FakeRangedSource {
        // Logical layout: "Hello", a 5-byte hole, "World".
        FakeRangedSource::new(
            b"Hello.....World",
            vec![dense(0, 5), sparse(5, 5), dense(10, 5)],
        )
    }

    fn not_cancelled() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn sparse_source_stores_only_dense_bytes() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["sparse_upload.txt"]);
        let result =
            write_sparse(&store, &path, &mut hello_world_source(), &not_cancelled()).unwrap();

        assert_eq!(result.logical_size, 15);
        assert_eq!(result.stored_size, 10);
        assert!(result.index_written);
        assert_eq!(store.raw("sparse_upload.txt").unwrap(), b"HelloWorld");

        let index: Vec<SparseRange> =
            serde_json::from_slice(&store.raw("sparse_upload.txt.idx").unwrap()).unwrap();
        assert_eq!(
            index,
            vec![
                SparseRange {
                    file_offset: 0,
                    original_offset: 0,
                    length: 5,
                    file_length: 5
                },
                SparseRange {
                    file_offset: 5,
                    original_offset: 5,
                    length: 5,
                    file_length: 0
                },
                SparseRange {
                    file_offset: 5,
                    original_offset: 10,
                    length: 5,
                    file_length: 5
                },
            ]
        );
    }

    #[test]
    fn digests_cover_exactly_the_stored_bytes() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["digests"]);
        let result =
            write_sparse(&store, &path, &mut hello_world_source(), &not_cancelled()).unwrap();

        let expected_sha = hex::encode(Sha256::digest(b"HelloWorld"));
        let expected_md5 = hex::encode(Md5::digest(b"HelloWorld"));
        assert_eq!(result.sha256, expected_sha);
        assert_eq!(result.md5, expected_md5);
    }

    #[test]
    fn dense_ranges_produce_no_side_car() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["dense"]);
        let mut source = FakeRangedSource::new(b"contents", vec![dense(0, 8)]);

        let result = write_sparse(&store, &path, &mut source, &not_cancelled()).unwrap();
        assert!(!result.index_written);
        assert_eq!(result.logical_size, 8);
        assert_eq!(result.stored_size, 8);
        assert_eq!(store.raw("dense").unwrap(), b"contents");
        assert!(store.raw("dense.idx").is_none());
    }

    #[test]
    fn rangeless_source_falls_back_to_dense_copy() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["fallback"]);
        let mut source = FakeRangedSource::new(b"plain stream", Vec::new());

        let result = write_sparse(&store, &path, &mut source, &not_cancelled()).unwrap();
        assert!(!result.index_written);
        assert_eq!(result.logical_size, 12);
        assert_eq!(result.stored_size, 12);
        assert_eq!(store.raw("fallback").unwrap(), b"plain stream");
    }

    #[test]
    fn rewrite_replaces_previous_content() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["rewrite"]);
        let mut first = FakeRangedSource::new(b"a much longer first version", Vec::new());
        write_sparse(&store, &path, &mut first, &not_cancelled()).unwrap();

        let mut second = FakeRangedSource::new(b"short", Vec::new());
        write_sparse(&store, &path, &mut second, &not_cancelled()).unwrap();
        assert_eq!(store.raw("rewrite").unwrap(), b"short");
    }

    #[test]
    fn cancellation_stops_between_chunks() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["cancelled"]);
        let cancel = AtomicBool::new(true);

        let err = write_sparse(&store, &path, &mut hello_world_source(), &cancel).unwrap_err();
        assert!(matches!(err, SparseError::Cancelled { written: 0 }));
        // The object itself was created (empty) and left in place.
        assert_eq!(store.raw("cancelled").unwrap_or_default(), b"");
    }

    #[test]
    fn truncated_source_is_a_short_read() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["short"]);
        let mut source = FakeRangedSource::new(b"abc", vec![dense(0, 10)]);

        let err = write_sparse(&store, &path, &mut source, &not_cancelled()).unwrap_err();
        assert!(matches!(
            err,
            SparseError::ShortRead {
                expected: 10,
                got: 3
            }
        ));
    }
}
