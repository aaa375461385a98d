//! Launch counter persisted across invocations.
//!
//! The counter is the only state that outlives one invocation. It selects
//! the spinner glyph in the status header, so consecutive runs are visibly
//! distinct on the panel.
//!
//! # Backends
//!
//! - [`MemoryCounter`]: in-process, for tests and one-shot runs
//! - `FileCounter`: JSON file, requires the `state-persistence` feature
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned to the caller |
//! | `StorageError::Serialization` | Unparseable JSON | Returned to the caller |
//! | Version mismatch | Older or newer file | Logged, counter restarts at 0 |
//! | Missing file | First run | Counter starts at 0 |

use std::fmt;
use std::sync::RwLock;

/// Spinner frames indexed by `launch % 4`.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Glyph shown in the status header for `launch`.
#[must_use]
pub fn spinner_glyph(launch: u64) -> char {
    SPINNER[(launch % SPINNER.len() as u64) as usize]
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from loading or saving the counter.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    #[cfg(feature = "state-persistence")]
    Serialization(String),
    /// Stored value cannot be used.
    Corruption(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "state-persistence")]
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Counter Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Where the launch counter lives between invocations.
pub trait CounterStore: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Last saved value; 0 when nothing was saved yet.
    fn load(&self) -> StorageResult<u64>;

    fn save(&self, launches: u64) -> StorageResult<()>;
}

/// Increment and persist the counter, returning the new value.
///
/// Wraps to 0 after `u64::MAX`.
pub fn next_launch(store: &dyn CounterStore) -> StorageResult<u64> {
    let launch = store.load()?.wrapping_add(1);
    store.save(launch)?;
    tracing::debug!(backend = store.name(), launch, "bumped launch counter");
    Ok(launch)
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Counter
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory counter.
#[derive(Default)]
pub struct MemoryCounter {
    value: RwLock<u64>,
}

impl MemoryCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(value: u64) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }
}

impl CounterStore for MemoryCounter {
    fn name(&self) -> &str {
        "MemoryCounter"
    }

    fn load(&self) -> StorageResult<u64> {
        self.value
            .read()
            .map(|v| *v)
            .map_err(|_| StorageError::Corruption("counter lock poisoned".into()))
    }

    fn save(&self, launches: u64) -> StorageResult<()> {
        let mut guard = self
            .value
            .write()
            .map_err(|_| StorageError::Corruption("counter lock poisoned".into()))?;
        *guard = launches;
        Ok(())
    }
}

impl fmt::Debug for MemoryCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCounter")
            .field("value", &self.load().ok())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Counter (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_counter {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    #[derive(Serialize, Deserialize)]
    struct CounterFile {
        format_version: u32,
        launches: u64,
    }

    impl CounterFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// Counter stored as JSON.
    ///
    /// ```json
    /// { "format_version": 1, "launches": 42 }
    /// ```
    ///
    /// Saves write `{path}.tmp`, sync it, then rename it over `{path}`.
    pub struct FileCounter {
        path: PathBuf,
    }

    impl FileCounter {
        /// The file is created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    impl CounterStore for FileCounter {
        fn name(&self) -> &str {
            "FileCounter"
        }

        fn load(&self) -> StorageResult<u64> {
            if !self.path.exists() {
                return Ok(0);
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let file: CounterFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse counter file: {e}"))
            })?;
            if file.format_version != CounterFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = file.format_version,
                    expected = CounterFile::FORMAT_VERSION,
                    "counter file format version mismatch, restarting at 0"
                );
                return Ok(0);
            }
            Ok(file.launches)
        }

        fn save(&self, launches: u64) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                let file = CounterFile {
                    format_version: CounterFile::FORMAT_VERSION,
                    launches,
                };
                serde_json::to_writer(&mut writer, &file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize counter: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(path = %self.path.display(), launches, "saved launch counter");
            Ok(())
        }
    }

    impl fmt::Debug for FileCounter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileCounter")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_counter::FileCounter;


#[cfg(all(test, feature = "state-persistence"))]
mod file_counter_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_zero() {
        let tmp = TempDir::new().unwrap();
        let store = FileCounter::new(tmp.path().join("launches.json"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("launches.json");
        let store = FileCounter::new(&path);

        assert_eq!(next_launch(&store).unwrap(), 1);
        assert_eq!(next_launch(&store).unwrap(), 2);

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(FileCounter::new(&path).load().unwrap(), 2);
    }

    #[test]
    fn version_mismatch_restarts() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("launches.json");
        std::fs::write(&path, r#"{"format_version":99,"launches":12}"#).unwrap();
        assert_eq!(FileCounter::new(&path).load().unwrap(), 0);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("launches.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileCounter::new(&path).load(),
            Err(StorageError::Serialization(_))
        ));
    }
}
