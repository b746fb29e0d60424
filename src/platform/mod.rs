//! Platform abstraction layer
//!
//! Handles the ambient services the simulation must not reach for directly:
//! - Time: an injectable clock so buff expiry is testable without real delays
//! - Storage: a local key-value store standing in for browser LocalStorage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic-enough wall clock, injected into the engine
pub trait Clock: Send {
    /// Milliseconds since some fixed origin
    fn now_ms(&self) -> f64;
}

/// Real clock measured from process start
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock for deterministic tests
#[derive(Clone, Default)]
pub struct ManualClock {
    ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.ms.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.ms.load(Ordering::Relaxed) as f64
    }
}

/// Local key-value store for save blobs
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store (tests, demo runs)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// One-file-per-key store rooted at a directory
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::warn!("storage dir unavailable: {e}");
            return;
        }
        if let Err(e) = std::fs::write(self.path(key), value) {
            log::warn!("save write failed: {e}");
        }
    }

    fn remove(&mut self, key: &str) {
        let _ = std::fs::remove_file(self.path(key));
    }
}
