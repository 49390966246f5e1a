//! File-backed reader facade, with an optional cache collaborator keyed on
//! the file's modification time.

use crate::error::Error;
use crate::value::Value;
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A cache collaborator for [`Reader`]. `ttl` of `0` from [`Cache::store`]
/// means "no expiry, invalidate by mtime alone".
pub trait Cache {
    fn time(&self, key: &str) -> Option<u64>;
    fn fetch(&self, key: &str) -> Option<Value>;
    fn store(&self, key: &str, value: Value, ttl: u64);
}

/// Reads and parses YAML files, consulting an optional [`Cache`] first.
pub struct Reader {
    cache: Option<Box<dyn Cache>>,
}

impl Reader {
    #[must_use]
    pub fn new() -> Self {
        Reader { cache: None }
    }

    #[must_use]
    pub fn with_cache(cache: impl Cache + 'static) -> Self {
        Reader {
            cache: Some(Box::new(cache)),
        }
    }

    /// Read and parse the YAML file at `path`.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Value, Error> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();

        if let Some(cache) = &self.cache {
            let metadata = path.metadata();
            if let (Some(cached_at), Ok(meta)) = (cache.time(&key), metadata) {
                let mtime = mtime_secs(&meta);
                if cached_at >= mtime
                    && let Some(value) = cache.fetch(&key)
                {
                    debug!("cache hit for {key}");
                    return Ok(value);
                }
            }
        }

        if !path.exists() {
            return Err(Error::FileNotFound(key));
        }
        let text = std::fs::read_to_string(path).map_err(|e| Error::FileUnreadable {
            path: key.clone(),
            source: Arc::new(e),
        })?;

        let value = crate::document::parse(&text)?;

        if let Some(cache) = &self.cache {
            cache.store(&key, value.clone(), 0);
        }

        Ok(value)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn mtime_secs(meta: &std::fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Write;

    struct MemoryCache {
        entries: RefCell<HashMap<String, (u64, Value)>>,
    }

    impl MemoryCache {
        fn new() -> Self {
            MemoryCache {
                entries: RefCell::new(HashMap::new()),
            }
        }
    }

    impl Cache for MemoryCache {
        fn time(&self, key: &str) -> Option<u64> {
            self.entries.borrow().get(key).map(|(t, _)| *t)
        }
        fn fetch(&self, key: &str) -> Option<Value> {
            self.entries.borrow().get(key).map(|(_, v)| v.clone())
        }
        fn store(&self, key: &str, value: Value, _ttl: u64) {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs();
            self.entries
                .borrow_mut()
                .insert(key.to_owned(), (now, value));
        }
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let r = Reader::new();
        assert!(matches!(
            r.read("/nonexistent/path/does-not-exist.yaml"),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn reads_and_parses_a_real_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut(), "a: 1\nb: two\n").unwrap();
        let r = Reader::new();
        let v = r.read(tmp.path()).unwrap();
        assert!(matches!(
            v.as_mapping().unwrap().get(&Value::String("a".into())),
            Some(Value::Int(1))
        ));
    }

    #[test]
    fn cache_hit_skips_reparse_when_not_stale() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp.as_file_mut(), "a: 1\n").unwrap();
        let cache = MemoryCache::new();
        let r = Reader::with_cache(cache);
        let first = r.read(tmp.path()).unwrap();
        let second = r.read(tmp.path()).unwrap();
        assert_eq!(first, second);
    }
}
