use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, RwLock};

use argus_paths::ContentPath;
use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ObjectStore, StoreEntry, StoreReader, StoreWriter};

#[derive(Clone, Debug)]
struct Object {
    data: Vec<u8>,
    mtime: DateTime<Utc>,
}

type ObjectMap = BTreeMap<String, Object>;

/// In-memory, `BTreeMap`-based object store.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock`
/// keyed by physical path; directory listings are derived from key
/// prefixes. Cloning the store shares the underlying map.
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<ObjectMap>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// The raw bytes of one object, by physical path. Test helper.
    pub fn raw(&self, physical_path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(physical_path)
            .map(|obj| obj.data.clone())
    }

    fn dir_key(path: &ContentPath) -> String {
        path.as_safe().components().join("/")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for MemoryStore {
    fn reader(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreReader>> {
        let key = path.as_physical_path();
        let map = self.objects.read().expect("lock poisoned");
        match map.get(&key) {
            Some(obj) => Ok(Box::new(MemoryReader {
                cursor: Cursor::new(obj.data.clone()),
            })),
            None => Err(StoreError::NotFound(key)),
        }
    }

    fn writer(&self, path: &ContentPath) -> StoreResult<Box<dyn StoreWriter>> {
        let key = path.as_physical_path();
        // Opening a writer creates the object, as a zero-length file.
        self.objects
            .write()
            .expect("lock poisoned")
            .entry(key.clone())
            .or_insert_with(|| Object {
                data: Vec::new(),
                mtime: Utc::now(),
            });
        Ok(Box::new(MemoryWriter {
            objects: Arc::clone(&self.objects),
            key,
        }))
    }

    fn stat(&self, path: &ContentPath) -> StoreResult<StoreEntry> {
        let key = path.as_physical_path();
        let map = self.objects.read().expect("lock poisoned");
        if let Some(obj) = map.get(&key) {
            let name = key.rsplit('/').next().unwrap_or(&key).to_string();
            return Ok(StoreEntry {
                name,
                size: obj.data.len() as u64,
                mtime: Some(obj.mtime),
                is_dir: false,
            });
        }

        // A prefix shared with any key is a directory.
        let dir = Self::dir_key(path);
        let has_children = dir.is_empty() && !map.is_empty()
            || map.keys().any(|k| k.starts_with(&format!("{dir}/")));
        if dir.is_empty() || has_children {
            return Ok(StoreEntry {
                name: dir.rsplit('/').next().unwrap_or("").to_string(),
                size: 0,
                mtime: None,
                is_dir: true,
            });
        }
        Err(StoreError::NotFound(key))
    }

    fn list_directory(&self, path: &ContentPath) -> StoreResult<Vec<StoreEntry>> {
        let dir = Self::dir_key(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let map = self.objects.read().expect("lock poisoned");
        let mut entries: BTreeMap<String, StoreEntry> = BTreeMap::new();
        for (key, obj) in map.iter() {
            let rel = match key.strip_prefix(&prefix) {
                Some(rel) if !rel.is_empty() => rel,
                _ => continue,
            };
            match rel.split_once('/') {
                Some((child, _)) => {
                    entries.entry(child.to_string()).or_insert(StoreEntry {
                        name: child.to_string(),
                        size: 0,
                        mtime: None,
                        is_dir: true,
                    });
                }
                None => {
                    entries.insert(
                        rel.to_string(),
                        StoreEntry {
                            name: rel.to_string(),
                            size: obj.data.len() as u64,
                            mtime: Some(obj.mtime),
                            is_dir: false,
                        },
                    );
                }
            }
        }

        if entries.is_empty() && !dir.is_empty() {
            if map.contains_key(&dir) {
                return Err(StoreError::NotADirectory(dir));
            }
            return Err(StoreError::NotFound(dir));
        }
        Ok(entries.into_values().collect())
    }

    fn delete(&self, path: &ContentPath) -> StoreResult<()> {
        let key = path.as_physical_path();
        let mut map = self.objects.write().expect("lock poisoned");
        match map.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key)),
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("object_count", &self.len())
            .finish()
    }
}

struct MemoryReader {
    cursor: Cursor<Vec<u8>>,
}

impl Read for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl StoreReader for MemoryReader {
    fn size(&self) -> StoreResult<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

struct MemoryWriter {
    objects: Arc<RwLock<ObjectMap>>,
    key: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut map = self.objects.write().expect("lock poisoned");
        let obj = map.entry(self.key.clone()).or_insert_with(|| Object {
            data: Vec::new(),
            mtime: Utc::now(),
        });
        obj.data.extend_from_slice(buf);
        obj.mtime = Utc::now();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StoreWriter for MemoryWriter {
    fn truncate(&mut self) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        if let Some(obj) = map.get_mut(&self.key) {
            obj.data.clear();
            obj.mtime = Utc::now();
        }
        Ok(())
    }
}
