//! In-memory [`KvStore`] used by tests and embedders without a disk.

use std::collections::HashMap;

use super::KvStore;
use crate::error::StorageError;

#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KvStore for MemoryKv {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A [`MemoryKv`] whose writes can be switched to fail, for error-path tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FlakyKv {
    pub inner: MemoryKv,
    pub fail_writes: bool,
}

#[cfg(test)]
impl KvStore for FlakyKv {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Locked);
        }
        self.inner.write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Locked);
        }
        self.inner.remove(key)
    }
}
