use std::io::{self, Read, Seek, SeekFrom};

use argus_paths::{ContentPath, PathType};
use argus_store::{ObjectStore, StoreError, StoreReader, StoreResult};

use crate::error::{SparseError, SparseResult};
use crate::index::{validate_index, SparseRange};

/// Logical view over a compacted object and its side-car range index.
///
/// Reads reconstruct the original stream: dense extents come from the
/// backing object, sparse extents are synthesized as zeros. An object
/// with no side-car is fully dense and reads pass straight through.
pub struct SparseReader {
    inner: Box<dyn StoreReader>,
    index: Option<Vec<SparseRange>>,
    logical_size: u64,
    position: u64,
}

impl std::fmt::Debug for SparseReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseReader")
            .field("index", &self.index)
            .field("logical_size", &self.logical_size)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl SparseReader {
    /// Open the object at `path`, consulting its side-car index.
    ///
    /// A missing side-car means the object is dense; a present but
    /// unparseable, unordered or overlapping one is
    /// [`SparseError::MalformedIndex`].
    pub fn open(store: &dyn ObjectStore, path: &ContentPath) -> SparseResult<Self> {
        let inner = store.reader(path)?;

        let index_path = path.set_type(PathType::ContentSparseIndex);
        let index = match store.reader(&index_path) {
            Ok(mut reader) => {
                let mut raw = String::new();
                reader.read_to_string(&mut raw)?;
                let index: Vec<SparseRange> = serde_json::from_str(&raw)
                    .map_err(|e| SparseError::MalformedIndex(e.to_string()))?;
                validate_index(&index)?;
                Some(index)
            }
            Err(StoreError::NotFound(_)) => None,
            Err(err) => return Err(err.into()),
        };

        let logical_size = match &index {
            Some(index) => index.iter().map(|r| r.length).sum(),
            None => inner.size()?,
        };

        Ok(Self {
            inner,
            index,
            logical_size,
            position: 0,
        })
    }

    /// Size of the logical stream: the sum of all descriptor lengths,
    /// or the physical size for a dense object.
    pub fn logical_size(&self) -> u64 {
        self.logical_size
    }

    /// Whether a side-car index was found.
    pub fn is_sparse(&self) -> bool {
        self.index.is_some()
    }
}

impl Read for SparseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let index = match &self.index {
            Some(index) => index,
            None => return self.inner.read(buf),
        };
        if buf.is_empty() || self.position >= self.logical_size {
            return Ok(0);
        }
        // Never hand out more than the logical stream holds, even when
        // gaps push extent ends past the sum of lengths.
        let remaining = (self.logical_size - self.position) as usize;
        let len = buf.len().min(remaining);
        let buf = &mut buf[..len];

        // Find the extent covering the position, or the next one after
        // it when the position falls into a gap between extents.
        let mut covering: Option<&SparseRange> = None;
        let mut next_start: Option<u64> = None;
        for range in index {
            if self.position >= range.original_offset && self.position < range.original_end() {
                covering = Some(range);
                break;
            }
            if range.original_offset > self.position {
                next_start = Some(range.original_offset);
                break;
            }
        }

        let n = match covering {
            Some(range) => {
                let rel = self.position - range.original_offset;
                let until_end = (range.original_end() - self.position) as usize;
                let n = buf.len().min(until_end);
                if rel < range.file_length {
                    // Dense bytes from the compacted object.
                    let stored = (range.file_length - rel) as usize;
                    let n = n.min(stored);
                    self.inner.seek(SeekFrom::Start(range.file_offset + rel))?;
                    self.inner.read(&mut buf[..n])?
                } else {
                    // Sparse tail of the extent.
                    buf[..n].fill(0);
                    n
                }
            }
            None => {
                // A gap before the next extent, or past the last one.
                let until = next_start.unwrap_or(self.logical_size);
                let n = buf.len().min((until.saturating_sub(self.position)) as usize);
                buf[..n].fill(0);
                n
            }
        };
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for SparseReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if self.index.is_none() {
            return self.inner.seek(pos);
        }
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.position as i64 + delta,
            SeekFrom::End(delta) => self.logical_size as i64 + delta,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of logical stream",
            ));
        }
        self.position = target as u64;
        Ok(self.position)
    }
}

impl StoreReader for SparseReader {
    fn size(&self) -> StoreResult<u64> {
        Ok(self.logical_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::tests::hello_world_source;
    use crate::writer::write_sparse;
    use argus_store::MemoryStore;
    use std::io::Write;
    use std::sync::atomic::AtomicBool;

    fn sparse_store() -> (MemoryStore, ContentPath) {
        let store = MemoryStore::new();
        let path = ContentPath::new(["sparse_upload.txt"]);
        write_sparse(
            &store,
            &path,
            &mut hello_world_source(),
            &AtomicBool::new(false),
        )
        .unwrap();
        (store, path)
    }

    #[test]
    fn reconstructs_the_logical_stream() {
        let (store, path) = sparse_store();
        let mut reader = SparseReader::open(&store, &path).unwrap();
        assert!(reader.is_sparse());
        assert_eq!(reader.logical_size(), 15);
        assert_eq!(reader.size().unwrap(), 15);

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"Hello\0\0\0\0\0World");
    }

    #[test]
    fn seeks_within_the_logical_stream() {
        let (store, path) = sparse_store();
        let mut reader = SparseReader::open(&store, &path).unwrap();

        reader.seek(SeekFrom::Start(3)).unwrap();
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"lo\0\0");

        reader.seek(SeekFrom::End(-5)).unwrap();
        let mut tail = Vec::new();
        reader.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"World");

        assert!(reader.seek(SeekFrom::Current(-100)).is_err());
    }

    #[test]
    fn dense_objects_pass_straight_through() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["dense"]);
        store.writer(&path).unwrap().write_all(b"contents").unwrap();

        let mut reader = SparseReader::open(&store, &path).unwrap();
        assert!(!reader.is_sparse());
        assert_eq!(reader.logical_size(), 8);

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"contents");
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = MemoryStore::new();
        let err = SparseReader::open(&store, &ContentPath::new(["absent"])).unwrap_err();
        assert!(matches!(err, SparseError::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn garbage_side_car_is_malformed() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["bad"]);
        store.writer(&path).unwrap().write_all(b"data").unwrap();
        store
            .writer(&path.set_type(PathType::ContentSparseIndex))
            .unwrap()
            .write_all(b"not json")
            .unwrap();

        let err = SparseReader::open(&store, &path).unwrap_err();
        assert!(matches!(err, SparseError::MalformedIndex(_)));
    }

    #[test]
    fn overlapping_side_car_is_malformed() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["overlap"]);
        store.writer(&path).unwrap().write_all(b"data").unwrap();
        let index = r#"[
            {"file_offset": 0, "original_offset": 0, "length": 5, "file_length": 5},
            {"file_offset": 5, "original_offset": 3, "length": 5, "file_length": 5}
        ]"#;
        store
            .writer(&path.set_type(PathType::ContentSparseIndex))
            .unwrap()
            .write_all(index.as_bytes())
            .unwrap();

        let err = SparseReader::open(&store, &path).unwrap_err();
        assert!(matches!(err, SparseError::MalformedIndex(_)));
    }

    #[test]
    fn gaps_between_extents_read_as_zeros() {
        let store = MemoryStore::new();
        let path = ContentPath::new(["gapped"]);
        store.writer(&path).unwrap().write_all(b"ab").unwrap();
        // Two 1-byte dense extents with a 3-byte uncovered gap between
        // them. Logical size is the sum of lengths, 2.
        let index = r#"[
            {"file_offset": 0, "original_offset": 0, "length": 1, "file_length": 1},
            {"file_offset": 1, "original_offset": 4, "length": 1, "file_length": 1}
        ]"#;
        store
            .writer(&path.set_type(PathType::ContentSparseIndex))
            .unwrap()
            .write_all(index.as_bytes())
            .unwrap();

        let mut reader = SparseReader::open(&store, &path).unwrap();
        assert_eq!(reader.logical_size(), 2);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"a\0");
    }
}
