//! In-memory template source with a logical clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use crate::templating::TemplateSource;

/// A [`TemplateSource`] holding files in memory.
///
/// Every write advances a logical clock by one second, so a rewritten file is
/// always strictly newer than before. An optional latency is applied to each
/// read and stat to widen race windows in concurrency tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: Mutex<HashMap<PathBuf, (String, SystemTime)>>,
    clock: AtomicU64,
    reads: AtomicUsize,
    latency: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Create or replace a file, bumping its modification time.
    pub fn write(&self, path: impl AsRef<Path>, text: &str) {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(tick);
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.as_ref().to_path_buf(), (text.to_string(), modified));
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        if let Ok(mut files) = self.files.lock() {
            files.remove(path.as_ref());
        }
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn entry(&self, path: &Path) -> io::Result<(String, SystemTime)> {
        self.files
            .lock()
            .map_err(|_| io::Error::other("memory source poisoned"))?
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
            })
    }
}

#[async_trait]
impl TemplateSource for MemorySource {
    async fn read(&self, path: &Path) -> io::Result<String> {
        self.delay().await;
        let (text, _) = self.entry(path)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(text)
    }

    async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.delay().await;
        self.entry(path).map(|(_, modified)| modified)
    }
}
