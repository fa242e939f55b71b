//! Named content storage for extracted components.
//!
//! A [`ContentCache`] maps an entry name to content and hands back a
//! [`CacheRef`] that is a pure function of the name. Saving the same name
//! again overwrites the entry in place.
//!
//! # Implementations
//!
//! - [`FileCache`]: one `<name>.vue` file per entry in a directory
//! - [`MemoryCache`]: entries held in process, for tests and embedding
use std::{
  collections::BTreeMap,
  fs,
  io::Write,
  path::{Path, PathBuf},
  sync::Mutex,
};

use log::{debug, trace};

use crate::error::CacheError;

/// File extension given to every cache entry.
const ENTRY_EXTENSION: &str = "vue";

/// Stable reference to a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheRef {
  /// Entry name as passed to the cache.
  pub name:   String,
  /// Location of the entry.
  pub path:   PathBuf,
  /// Relative import specifier, `./<name>.vue`.
  pub import: String,
}

/// Storage for named content blobs.
///
/// Implementations must tolerate concurrent saves of distinct names. Two
/// concurrent saves of the same name race, and the last writer wins.
pub trait ContentCache: Send + Sync {
  /// Reference for `name`, whether or not it has been saved yet.
  ///
  /// # Errors
  ///
  /// Returns [`CacheError::InvalidName`] for names that are empty or would
  /// escape the cache.
  fn reference(&self, name: &str) -> Result<CacheRef, CacheError>;

  /// Store `content` under `name`, replacing any previous content.
  ///
  /// # Errors
  ///
  /// Returns an error if the name is invalid or the write fails. Write
  /// failures are never swallowed.
  fn save(&self, name: &str, content: &str) -> Result<CacheRef, CacheError>;

  /// Content previously stored under `name`.
  ///
  /// # Errors
  ///
  /// Returns an error if the name is invalid or the entry cannot be read.
  fn load(&self, name: &str) -> Result<Option<String>, CacheError>;
}

/// Reject names that are empty, `.` or `..`, or contain a path separator or
/// NUL. Anything else stays a single file name inside the cache directory.
fn validate_name(name: &str) -> Result<(), CacheError> {
  if matches!(name, "" | "." | "..") || name.contains(['/', '\\', '\0']) {
    return Err(CacheError::InvalidName(name.to_string()));
  }
  Ok(())
}

fn import_for(name: &str) -> String {
  format!("./{name}.{ENTRY_EXTENSION}")
}

/// Directory-backed [`ContentCache`].
///
/// Directory layout:
/// ```text
/// {dir}/
/// +-- guide-component-0.vue
/// +-- guide-component-1.vue
/// +-- guide-1a2b3c4d.vue
/// ```
#[derive(Debug, Clone)]
pub struct FileCache {
  dir: PathBuf,
}

impl FileCache {
  /// Create a cache rooted at `dir`. The directory is created on first save.
  #[must_use]
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Root directory of the cache.
  #[must_use]
  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn entry_path(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{name}.{ENTRY_EXTENSION}"))
  }
}

impl ContentCache for FileCache {
  fn reference(&self, name: &str) -> Result<CacheRef, CacheError> {
    validate_name(name)?;
    Ok(CacheRef {
      name:   name.to_string(),
      path:   self.entry_path(name),
      import: import_for(name),
    })
  }

  fn save(&self, name: &str, content: &str) -> Result<CacheRef, CacheError> {
    let reference = self.reference(name)?;

    if fs::read_to_string(&reference.path).is_ok_and(|old| old == content) {
      trace!("Cache entry '{name}' unchanged, reusing it");
      return Ok(reference);
    }

    fs::create_dir_all(&self.dir)
      .map_err(|e| CacheError::io(&self.dir, e))?;

    // Sibling temp file, then rename into place.
    let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
      .map_err(|e| CacheError::io(&self.dir, e))?;
    tmp
      .write_all(content.as_bytes())
      .map_err(|e| CacheError::io(tmp.path(), e))?;
    tmp
      .persist(&reference.path)
      .map_err(|e| CacheError::io(&reference.path, e.error))?;

    debug!("Wrote cache entry {}", reference.path.display());
    Ok(reference)
  }

  fn load(&self, name: &str) -> Result<Option<String>, CacheError> {
    let reference = self.reference(name)?;
    match fs::read_to_string(&reference.path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(CacheError::io(&reference.path, e)),
    }
  }
}

/// In-process [`ContentCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
  entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCache {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored entries.
  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.lock().map_or(0, |entries| entries.len())
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Names of all stored entries, sorted.
  #[must_use]
  pub fn names(&self) -> Vec<String> {
    self
      .entries
      .lock()
      .map(|entries| entries.keys().cloned().collect())
      .unwrap_or_default()
  }
}

impl ContentCache for MemoryCache {
  fn reference(&self, name: &str) -> Result<CacheRef, CacheError> {
    validate_name(name)?;
    Ok(CacheRef {
      name:   name.to_string(),
      path:   PathBuf::from(format!("{name}.{ENTRY_EXTENSION}")),
      import: import_for(name),
    })
  }

  fn save(&self, name: &str, content: &str) -> Result<CacheRef, CacheError> {
    let reference = self.reference(name)?;
    self
      .entries
      .lock()
      .map_err(|_| CacheError::Poisoned)?
      .insert(name.to_string(), content.to_string());
    Ok(reference)
  }

  fn load(&self, name: &str) -> Result<Option<String>, CacheError> {
    validate_name(name)?;
    Ok(
      self
        .entries
        .lock()
        .map_err(|_| CacheError::Poisoned)?
        .get(name)
        .cloned(),
    )
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use std::{sync::Arc, thread};

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_reference_is_function_of_name() {
    let cache = FileCache::new("/tmp/vuedown-cache");
    let a = cache.reference("guide-component-0").unwrap();
    let b = cache.reference("guide-component-0").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.import, "./guide-component-0.vue");
    assert_eq!(
      a.path,
      PathBuf::from("/tmp/vuedown-cache/guide-component-0.vue")
    );
  }

  #[test]
  fn test_invalid_names_rejected() {
    let cache = MemoryCache::new();
    for name in ["", ".", "..", "a/b", "a\\b", "../x", "a\0b"] {
      assert!(
        matches!(cache.save(name, "x"), Err(CacheError::InvalidName(_))),
        "name {name:?} should be rejected"
      );
    }
  }

  #[test]
  fn test_dotted_names_accepted() {
    let tmp = TempDir::new().unwrap();
    let cache = FileCache::new(tmp.path());

    let reference = cache.save("v1..2-component-0", "<b>x</b>").unwrap();
    assert_eq!(reference.path, tmp.path().join("v1..2-component-0.vue"));
    assert_eq!(
      cache.load("v1..2-component-0").unwrap().as_deref(),
      Some("<b>x</b>")
    );
  }

  #[test]
  fn test_file_cache_save_and_load() {
    let tmp = TempDir::new().unwrap();
    let cache = FileCache::new(tmp.path().join("cache"));

    let reference = cache.save("page", "<div>hello</div>").unwrap();
    assert!(reference.path.exists());
    assert_eq!(
      cache.load("page").unwrap().as_deref(),
      Some("<div>hello</div>")
    );
    assert_eq!(cache.load("missing").unwrap(), None);
  }

  #[test]
  fn test_file_cache_overwrite() {
    let tmp = TempDir::new().unwrap();
    let cache = FileCache::new(tmp.path());

    let first = cache.save("page", "v1").unwrap();
    let second = cache.save("page", "v2").unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.load("page").unwrap().as_deref(), Some("v2"));
  }

  #[test]
  fn test_file_cache_unchanged_content_not_rewritten() {
    let tmp = TempDir::new().unwrap();
    let cache = FileCache::new(tmp.path());

    let reference = cache.save("page", "same").unwrap();
    let before = fs::metadata(&reference.path).unwrap().modified().unwrap();
    thread::sleep(std::time::Duration::from_millis(20));
    cache.save("page", "same").unwrap();
    let after = fs::metadata(&reference.path).unwrap().modified().unwrap();
    assert_eq!(before, after);
  }

  #[test]
  fn test_file_cache_write_failure_propagates() {
    let tmp = TempDir::new().unwrap();
    // A regular file where the cache directory should be
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let cache = FileCache::new(&blocker);
    assert!(matches!(
      cache.save("page", "content"),
      Err(CacheError::Io { .. })
    ));
  }

  #[test]
  fn test_file_cache_concurrent_distinct_names() {
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(tmp.path()));

    let handles: Vec<_> = (0..8)
      .map(|i| {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
          cache
            .save(&format!("doc-component-{i}"), &format!("content {i}"))
            .unwrap();
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }

    for i in 0..8 {
      assert_eq!(
        cache.load(&format!("doc-component-{i}")).unwrap(),
        Some(format!("content {i}"))
      );
    }
  }

  #[test]
  fn test_memory_cache() {
    let cache = MemoryCache::new();
    assert!(cache.is_empty());

    let reference = cache.save("b", "2").unwrap();
    cache.save("a", "1").unwrap();
    assert_eq!(reference.import, "./b.vue");
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(cache.load("a").unwrap().as_deref(), Some("1"));
    assert_eq!(cache.load("c").unwrap(), None);
  }
}
