use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use argus_paths::ContentPath;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ObjectStore, StoreEntry, StoreReader, StoreWriter};

/// Object store backed by a local directory tree.
///
/// Physical paths map directly to files under the root. Components are
/// sanitized before they reach this layer, so joining them is safe on
/// every filesystem the sanitizer targets.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// A store rooted at `root`. The directory is created lazily, on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, path: &ContentPath) -> PathBuf {
        let mut out = self.root.clone();
        for segment in path.as_physical_path().split('/') {
            if !segment.is_empty() {
                out.push(segment);
            }
        }
        out
    }

    fn dir_path(&self, path: &ContentPath) -> PathBuf {
        let mut out = self.root.clone();
        for component in path.as_safe().components() {
            out.push(component);
        }
        out
    }
}

fn map_not_found(err: io::Error, key: String) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(key)
    } else {
        StoreError::Io(err)
    }
}

fn mtime_of(metadata: &fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

impl ObjectStore for DirectoryStore {
    fn reader(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreReader>> {
        let key = path.as_physical_path();
        let file = File::open(self.object_path(path)).map_err(|e| map_not_found(e, key))?;
        Ok(Box::new(FileReader { file }))
    }

    fn writer(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreWriter>> {
        let full = self.object_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.as_physical_path(), "opening append writer");
        let file = OpenOptions::new().append(true).create(true).open(full)?;
        Ok(Box::new(FileWriter { file }))
    }

    fn stat(&self, path: &ContentPath) -> StoreResult<StoreEntry> {
        let key = path.as_physical_path();
        let full = self.object_path(path);
        let metadata = fs::metadata(&full).map_err(|e| map_not_found(e, key.clone()))?;
        let name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(StoreEntry {
            name,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            mtime: mtime_of(&metadata),
            is_dir: metadata.is_dir(),
        })
    }

    fn list_directory(&self, path: &ContentPath) -> StoreResult<Vec<StoreEntry>> {
        let key = path.as_physical_path();
        let dir = self.dir_path(path);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| map_not_found(e, key))? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(StoreEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                mtime: mtime_of(&metadata),
                is_dir: metadata.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn delete(&self, path: &ContentPath) -> StoreResult<()> {
        let key = path.as_physical_path();
        debug!(path = %key, "deleting object");
        fs::remove_file(self.object_path(path)).map_err(|e| map_not_found(e, key))
    }
}

struct FileReader {
    file: File,
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl StoreReader for FileReader {
    fn size(&self) -> StoreResult<u64> {
        Ok(self.file.metadata()?.len())
    }
}

struct FileWriter {
    file: File,
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl StoreWriter for FileWriter {
    fn truncate(&mut self) -> StoreResult<()> {
        self.file.set_len(0)?;
        Ok(())
    }
}
