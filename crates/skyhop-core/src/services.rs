use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Failure reported by an effect sink for a single cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The asset backing the cue was never loaded.
    Unavailable(String),
    /// The backend refused the cue for another reason.
    Rejected(String),
}

impl std::fmt::Display for EffectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(m) => write!(f, "effect unavailable: {m}"),
            Self::Rejected(m) => write!(f, "effect rejected: {m}"),
        }
    }
}

impl std::error::Error for EffectError {}

/// Failure reported by a score store.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Parse(String),
    Encode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "store io error: {e}"),
            Self::Parse(m) => write!(f, "store parse error: {m}"),
            Self::Encode(m) => write!(f, "store encode error: {m}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(_) | Self::Encode(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Fire-and-forget sink for sounds, loops and spawned visuals.
pub trait EffectSink<C> {
    fn emit(&mut self, cue: &C) -> Result<(), EffectError>;
}

/// Sink that accepts and drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<C> EffectSink<C> for NullSink {
    fn emit(&mut self, _cue: &C) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Sink that records every accepted cue, optionally refusing some of them.
#[derive(Debug, Clone)]
pub struct RecordingSink<C> {
    pub played: Vec<C>,
    missing: Vec<C>,
    pub failures: usize,
}

impl<C> Default for RecordingSink<C> {
    fn default() -> Self {
        Self {
            played: Vec::new(),
            missing: Vec::new(),
            failures: 0,
        }
    }
}

impl<C: Clone + PartialEq> RecordingSink<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose backend lacks the given cues.
    pub fn missing(cues: Vec<C>) -> Self {
        Self {
            missing: cues,
            ..Self::default()
        }
    }

    pub fn count(&self, cue: &C) -> usize {
        self.played.iter().filter(|c| *c == cue).count()
    }
}

impl<C: Clone + PartialEq + std::fmt::Debug> EffectSink<C> for RecordingSink<C> {
    fn emit(&mut self, cue: &C) -> Result<(), EffectError> {
        if self.missing.contains(cue) {
            self.failures += 1;
            return Err(EffectError::Unavailable(format!("{cue:?}")));
        }
        self.played.push(cue.clone());
        Ok(())
    }
}

/// Key-value persistence for numbers (high score, best height).
pub trait ScoreStore {
    fn get_number(&self, key: &str) -> Option<f64>;
    fn set_number(&mut self, key: &str, value: f64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get_number(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    fn set_number(&mut self, key: &str, value: f64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a flat TOML table, rewritten on every set.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, f64>,
}

impl TomlFileStore {
    /// Open the store at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<BTreeMap<String, f64>>(&contents)
                .map_err(|e| StoreError::Parse(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "Opened score store");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let encoded =
            toml::to_string(&self.values).map_err(|e| StoreError::Encode(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl ScoreStore for TomlFileStore {
    fn get_number(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    fn set_number(&mut self, key: &str, value: f64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "skyhop-{name}-{}-{nanos}.toml",
            std::process::id()
        ))
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_number("best"), None);
        store.set_number("best", 420.0).unwrap();
        assert_eq!(store.get_number("best"), Some(420.0));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let path = scratch_path("persist");
        {
            let mut store = TomlFileStore::open(&path).unwrap();
            assert_eq!(store.get_number("skyhop.high_score"), None);
            store.set_number("skyhop.high_score", 1250.0).unwrap();
        }
        let store = TomlFileStore::open(&path).unwrap();
        assert_eq!(store.get_number("skyhop.high_score"), Some(1250.0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_store_rejects_garbage() {
        let path = scratch_path("garbage");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = TomlFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn recording_sink_refuses_missing_cues() {
        let mut sink = RecordingSink::missing(vec!["jetpack_loop"]);
        assert!(sink.emit(&"jump").is_ok());
        assert_eq!(
            sink.emit(&"jetpack_loop"),
            Err(EffectError::Unavailable("\"jetpack_loop\"".to_string()))
        );
        assert_eq!(sink.played, vec!["jump"]);
        assert_eq!(sink.failures, 1);
        assert_eq!(sink.count(&"jump"), 1);
    }

    #[test]
    fn error_display() {
        let e = EffectError::Rejected("busy".into());
        assert_eq!(e.to_string(), "effect rejected: busy");
        let e = StoreError::Parse("bad".into());
        assert_eq!(e.to_string(), "store parse error: bad");
    }
}
