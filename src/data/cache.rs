use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::error::LoadError;
use super::loader::{Source, load};
use super::model::Dataset;

/// Content identity of a source: SHA-256 of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey([u8; 32]);

impl SourceKey {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        SourceKey(Sha256::digest(bytes).into())
    }

    pub fn of(source: &Source) -> Result<Self, LoadError> {
        Ok(Self::of_bytes(&source.read_bytes()?))
    }
}

/// Single-entry dataset cache owned by one session.
///
/// Unchanged input (same bytes) is not reparsed; anything else replaces the
/// entry wholesale.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceKey, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, source: &Source) -> Result<Arc<Dataset>, LoadError> {
        let key = SourceKey::of(source)?;
        if let Some((cached, dataset)) = &self.entry {
            if *cached == key {
                log::debug!("Dataset cache hit for {}", source.label());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load(source)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset, e.g. when a new file is uploaded.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("Dataset cache invalidated");
        }
    }

    pub fn key(&self) -> Option<SourceKey> {
        self.entry.as_ref().map(|(key, _)| *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_A: &str = "Region,Item,OrderDate,Units,Unit Price\nEast,Pen,2023-01-05,10,1.5\n";
    const CSV_B: &str = "Region,Item,OrderDate,Units,Unit Price\nWest,Desk,2023-02-01,2,50.0\n";

    #[test]
    fn same_bytes_hit_the_cache() {
        let mut cache = DatasetCache::new();
        let a = cache
            .get_or_load(&Source::bytes("a.csv", CSV_A.into()))
            .unwrap();
        // Different name, same content: still the same dataset.
        let b = cache
            .get_or_load(&Source::bytes("renamed.csv", CSV_A.into()))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn new_content_replaces_entry() {
        let mut cache = DatasetCache::new();
        let a = cache
            .get_or_load(&Source::bytes("a.csv", CSV_A.into()))
            .unwrap();
        let b = cache
            .get_or_load(&Source::bytes("b.csv", CSV_B.into()))
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.records[0].region, "West");
        assert_eq!(cache.key(), Some(SourceKey::of_bytes(CSV_B.as_bytes())));
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut cache = DatasetCache::new();
        let source = Source::bytes("a.csv", CSV_A.into());
        let a = cache.get_or_load(&source).unwrap();
        cache.invalidate();
        assert!(cache.key().is_none());
        let b = cache.get_or_load(&source).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
    }

    #[test]
    fn failed_load_keeps_previous_entry() {
        let mut cache = DatasetCache::new();
        cache
            .get_or_load(&Source::bytes("a.csv", CSV_A.into()))
            .unwrap();
        let bad = Source::bytes("bad.csv", b"Region,Item\nEast,Pen\n".to_vec());
        assert!(cache.get_or_load(&bad).is_err());
        assert_eq!(cache.key(), Some(SourceKey::of_bytes(CSV_A.as_bytes())));
    }
}
