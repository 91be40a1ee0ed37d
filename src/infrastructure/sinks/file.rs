//! Size-capped, auto-rolling local log file
//!
//! The active file lives at the configured path. When a write would push it
//! past the size threshold it is rolled: renamed to a timestamped generation
//! (`<stem>-<YYYY-MM-DDTHH-MM-SS.mmm>.<ext>`) and replaced by a fresh file.
//! After every roll old generations are pruned beyond the retention count and
//! the survivors are compressed with zstd (`<generation>.zst`).
//!
//! [`RollingFile::rotate_now`] forces the same roll regardless of size; the
//! day-boundary rotation uses it through [`DayRotator`].

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime, Utc};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::domain::errors::{LogError, SinkError};
use crate::domain::models::RollingPolicy;
use crate::domain::ports::{DayRotator, Sink};

const GENERATION_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESSED_SUFFIX: &str = ".zst";
const ZSTD_LEVEL: i32 = 3;

/// Rolling file sink.
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    state: Mutex<FileState>,
    retention: Retention,
}

#[derive(Default)]
struct FileState {
    writer: Option<BufWriter<File>>,
    size: u64,
}

/// A rotated-out generation of the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Location on disk.
    pub path: PathBuf,
    /// Roll time parsed from the file name.
    pub rotated_at: NaiveDateTime,
    /// Whether the generation is zstd-compressed.
    pub compressed: bool,
}

impl RollingFile {
    /// Open (or create) the log file at `path`.
    ///
    /// Parent directories are created. Failing to create or open the file is
    /// a configuration error: the destination is unusable.
    pub fn new(path: impl Into<PathBuf>, policy: RollingPolicy) -> Result<Self, LogError> {
        let path = path.into();
        let invalid = |source: io::Error| LogError::InvalidDestination {
            path: path.clone(),
            source,
        };

        if path.file_name().is_none() {
            return Err(invalid(io::Error::new(
                io::ErrorKind::InvalidInput,
                "log path has no file name",
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(invalid)?;
        }

        let file = Self {
            retention: Retention::new(&path, policy),
            max_bytes: policy.max_size_bytes().max(1),
            path: path.clone(),
            state: Mutex::new(FileState::default()),
        };

        let rolled = {
            let mut state = file
                .state
                .lock()
                .map_err(|e| LogError::InvalidConfig(e.to_string()))?;
            let rolled = file.open_existing_or_new(&mut state, 0).map_err(invalid)?;
            rolled
        };
        if rolled {
            file.retention.schedule();
        }

        Ok(file)
    }

    /// Override the size threshold in bytes.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes.max(1);
        self
    }

    /// Path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size threshold in bytes.
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Retention policy.
    pub const fn policy(&self) -> RollingPolicy {
        self.retention.policy
    }

    /// Append one buffer, rolling first if it would not fit.
    pub fn append(&self, buf: &[u8]) -> Result<usize, SinkError> {
        let len = buf.len() as u64;
        if len > self.max_bytes {
            return Err(SinkError::Oversized {
                len,
                max: self.max_bytes,
            });
        }

        let mut state = self.lock()?;
        let rolled = if state.writer.is_none() {
            self.open_existing_or_new(&mut state, len)?
        } else if state.size + len > self.max_bytes {
            self.roll(&mut state)?;
            true
        } else {
            false
        };

        let writer = state.writer.as_mut().ok_or_else(|| {
            SinkError::Io(io::Error::new(io::ErrorKind::NotConnected, "log file not open"))
        })?;
        writer.write_all(buf)?;
        state.size += len;
        drop(state);

        if rolled {
            debug!(path = %self.path.display(), "rolled log file on size");
            self.retention.schedule();
        }

        Ok(buf.len())
    }

    /// Flush buffered records to the operating system.
    pub fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        if let Some(writer) = state.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Roll the file now, then prune and compress generations before returning.
    ///
    /// Only the roll decides the outcome. Retention failures are logged and
    /// left for the next roll to retry.
    pub fn rotate_now(&self) -> Result<(), LogError> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|e| LogError::Rotation(format!("log file state poisoned: {e}")))?;
            self.roll(&mut state)?;
        }

        info!(path = %self.path.display(), "rotated log file");
        if let Err(e) = self.retention.run() {
            warn!(path = %self.path.display(), error = %e, "log retention failed after rotation");
        }
        Ok(())
    }

    /// Rotated generations on disk, newest first.
    pub fn generations(&self) -> io::Result<Vec<Generation>> {
        self.retention.generations()
    }

    fn lock(&self) -> Result<MutexGuard<'_, FileState>, SinkError> {
        self.state
            .lock()
            .map_err(|e| SinkError::Poisoned(e.to_string()))
    }

    /// Open the file for appending, or roll it first if `write_len` would overflow it.
    /// Returns whether a roll happened.
    fn open_existing_or_new(&self, state: &mut FileState, write_len: u64) -> io::Result<bool> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.open_new(state)?;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if metadata.len() + write_len > self.max_bytes {
            self.open_new(state)?;
            return Ok(true);
        }

        let file = File::options().append(true).open(&self.path)?;
        state.writer = Some(BufWriter::new(file));
        state.size = metadata.len();
        Ok(false)
    }

    fn roll(&self, state: &mut FileState) -> io::Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }
        self.open_new(state)
    }

    /// Move any existing file aside as a generation and start an empty one.
    fn open_new(&self, state: &mut FileState) -> io::Result<()> {
        if self.path.exists() {
            let generation = self.retention.next_generation_path()?;
            fs::rename(&self.path, &generation)?;
        }

        let file = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        state.writer = Some(BufWriter::new(file));
        state.size = 0;
        Ok(())
    }
}

#[async_trait]
impl Sink for RollingFile {
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        self.append(buf)
    }

    async fn sync(&self) -> Result<(), SinkError> {
        self.flush()
    }
}

impl DayRotator for RollingFile {
    fn rotate(&self) -> Result<(), LogError> {
        self.rotate_now()
    }
}

impl std::fmt::Debug for RollingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

/// Naming, pruning and compression of rotated generations.
#[derive(Clone)]
struct Retention {
    dir: PathBuf,
    prefix: String,
    ext: String,
    policy: RollingPolicy,
    running: Arc<Mutex<()>>,
}

impl Retention {
    fn new(path: &Path, policy: RollingPolicy) -> Self {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            dir,
            prefix: format!("{stem}-"),
            ext,
            policy,
            running: Arc::new(Mutex::new(())),
        }
    }

    fn now(&self) -> NaiveDateTime {
        if self.policy.local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    fn generation_path(&self, at: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            self.prefix,
            at.format(GENERATION_FORMAT),
            self.ext
        ))
    }

    /// A generation name not yet taken and newer than every existing one.
    fn next_generation_path(&self) -> io::Result<PathBuf> {
        let mut at = self.now();
        if let Some(newest) = self.generations()?.first() {
            if newest.rotated_at >= at {
                at = newest.rotated_at + Duration::milliseconds(1);
            }
        }
        loop {
            let candidate = self.generation_path(at);
            let compressed = compressed_path(&candidate);
            if !candidate.exists() && !compressed.exists() {
                return Ok(candidate);
            }
            at += Duration::milliseconds(1);
        }
    }

    fn parse_generation(&self, path: &Path) -> Option<Generation> {
        let name = path.file_name()?.to_str()?;
        let rest = name.strip_prefix(&self.prefix)?;
        let (rest, compressed) = match rest.strip_suffix(COMPRESSED_SUFFIX) {
            Some(rest) => (rest, true),
            None => (rest, false),
        };
        let stamp = rest.strip_suffix(self.ext.as_str())?;
        let rotated_at = NaiveDateTime::parse_from_str(stamp, GENERATION_FORMAT).ok()?;

        Some(Generation {
            path: path.to_path_buf(),
            rotated_at,
            compressed,
        })
    }

    fn generations(&self) -> io::Result<Vec<Generation>> {
        let mut generations = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(generation) = self.parse_generation(&entry.path()) {
                generations.push(generation);
            }
        }
        generations.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
        Ok(generations)
    }

    /// Prune generations beyond the retention count, then compress the rest.
    fn run(&self) -> io::Result<()> {
        let _running = self
            .running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut generations = self.generations()?;

        let keep = self.policy.max_backups;
        if keep > 0 && generations.len() > keep {
            for expired in generations.split_off(keep) {
                fs::remove_file(&expired.path)?;
                info!(path = %expired.path.display(), "removed expired log generation");
            }
        }

        if self.policy.compress {
            for generation in generations.iter().filter(|g| !g.compressed) {
                compress(&generation.path)?;
                debug!(path = %generation.path.display(), "compressed log generation");
            }
        }

        Ok(())
    }

    /// Run retention on the blocking pool when inside a runtime, inline otherwise.
    fn schedule(&self) {
        let retention = self.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    if let Err(e) = retention.run() {
                        warn!(error = %e, "log retention failed");
                    }
                });
            }
            Err(_) => {
                if let Err(e) = retention.run() {
                    warn!(error = %e, "log retention failed");
                }
            }
        }
    }
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

fn compress(path: &Path) -> io::Result<()> {
    let target = compressed_path(path);
    let source = File::open(path)?;
    let mut output = BufWriter::new(File::create(&target)?);
    zstd::stream::copy_encode(source, &mut output, ZSTD_LEVEL)?;
    output.flush()?;
    fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn policy(max_backups: usize, compress: bool) -> RollingPolicy {
        RollingPolicy {
            max_size_mb: 1,
            max_backups,
            compress,
            local_time: true,
        }
    }

    #[test]
    fn test_new_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs/app/normal.log");

        let file = RollingFile::new(&log_path, policy(3, false)).unwrap();
        assert!(log_path.exists());
        assert_eq!(file.path(), log_path);
    }

    #[test]
    fn test_new_rejects_unusable_destination() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = RollingFile::new(blocker.join("app.log"), policy(3, false));
        assert!(matches!(result, Err(LogError::InvalidDestination { .. })));
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        std::fs::write(&log_path, b"earlier\n").unwrap();

        let file = RollingFile::new(&log_path, policy(3, false)).unwrap();
        file.append(b"later\n").unwrap();
        file.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "earlier\nlater\n");
    }

    #[test]
    fn test_rolls_when_size_exceeded() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let file = RollingFile::new(&log_path, policy(10, false))
            .unwrap()
            .with_max_bytes(16);

        file.append(b"0123456789\n").unwrap();
        file.append(b"abcdefghij\n").unwrap();
        file.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "abcdefghij\n");
        let generations = file.generations().unwrap();
        assert_eq!(generations.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&generations[0].path).unwrap(),
            "0123456789\n"
        );
        let name = generations[0].path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("app-") && name.ends_with(".log"), "{name}");
    }

    #[test]
    fn test_oversized_write_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = RollingFile::new(temp_dir.path().join("app.log"), policy(3, false))
            .unwrap()
            .with_max_bytes(4);

        let result = file.append(b"too long");
        assert!(matches!(result, Err(SinkError::Oversized { len: 8, max: 4 })));
    }

    #[test]
    fn test_retention_prunes_oldest_generations() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let file = RollingFile::new(&log_path, policy(2, false))
            .unwrap()
            .with_max_bytes(8);

        for i in 0..5 {
            file.append(format!("line-{i}\n").as_bytes()).unwrap();
        }
        file.flush().unwrap();

        let generations = file.generations().unwrap();
        assert_eq!(generations.len(), 2);
        assert_eq!(std::fs::read_to_string(&generations[0].path).unwrap(), "line-3\n");
        assert_eq!(std::fs::read_to_string(&generations[1].path).unwrap(), "line-2\n");
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "line-4\n");
    }

    #[test]
    fn test_rotate_now_compresses_generation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let file = RollingFile::new(&log_path, policy(5, true)).unwrap();

        file.append(b"{\"msg\":\"before midnight\"}\n").unwrap();
        file.rotate_now().unwrap();
        file.append(b"{\"msg\":\"after midnight\"}\n").unwrap();
        file.flush().unwrap();

        let generations = file.generations().unwrap();
        assert_eq!(generations.len(), 1);
        assert!(generations[0].compressed);
        assert!(generations[0].path.to_string_lossy().ends_with(".log.zst"));

        let raw = std::fs::read(&generations[0].path).unwrap();
        let restored = zstd::decode_all(&raw[..]).unwrap();
        assert_eq!(restored, b"{\"msg\":\"before midnight\"}\n");
        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "{\"msg\":\"after midnight\"}\n"
        );
    }

    #[test]
    fn test_rotate_now_succeeds_when_compression_fails() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("app-2020-01-01T00-00-00.000.log");
        std::fs::write(&stale, b"old\n").unwrap();
        std::fs::create_dir(temp_dir.path().join("app-2020-01-01T00-00-00.000.log.zst")).unwrap();

        let file = RollingFile::new(temp_dir.path().join("app.log"), policy(5, true)).unwrap();
        file.append(b"before\n").unwrap();
        file.rotate_now().unwrap();
        file.append(b"after\n").unwrap();
        file.flush().unwrap();

        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("app.log")).unwrap(),
            "after\n"
        );
        let generations = file.generations().unwrap();
        assert_eq!(generations.len(), 2);
        assert!(generations[0].compressed);
        assert!(!generations[1].compressed);
        assert_eq!(generations[1].path, stale);
    }

    #[tokio::test]
    async fn test_size_rolls_in_runtime_prune_and_compress_in_background() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let file = RollingFile::new(&log_path, policy(2, true))
            .unwrap()
            .with_max_bytes(8);

        for i in 0..5 {
            file.append(format!("line-{i}\n").as_bytes()).unwrap();
        }
        file.flush().unwrap();

        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        let generations = loop {
            let generations = file.generations().unwrap();
            if generations.len() == 2 && generations.iter().all(|g| g.compressed) {
                break generations;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "retention did not settle: {generations:?}"
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };

        let restored: Vec<Vec<u8>> = generations
            .iter()
            .map(|g| zstd::decode_all(&std::fs::read(&g.path).unwrap()[..]).unwrap())
            .collect();
        assert_eq!(restored, vec![b"line-3\n".to_vec(), b"line-2\n".to_vec()]);
        assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "line-4\n");
    }

    #[test]
    fn test_generation_names_never_collide() {
        let temp_dir = TempDir::new().unwrap();
        let file = RollingFile::new(temp_dir.path().join("app.log"), policy(0, false)).unwrap();

        for _ in 0..4 {
            file.append(b"x\n").unwrap();
            file.rotate_now().unwrap();
        }

        let generations = file.generations().unwrap();
        assert_eq!(generations.len(), 4);
        let mut stamps: Vec<_> = generations.iter().map(|g| g.rotated_at).collect();
        stamps.dedup();
        assert_eq!(stamps.len(), 4);
    }

    #[test]
    fn test_unrelated_files_are_not_generations() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("app-notes.log"), b"keep").unwrap();
        std::fs::write(temp_dir.path().join("other.txt"), b"keep").unwrap();

        let file = RollingFile::new(temp_dir.path().join("app.log"), policy(1, true)).unwrap();
        file.rotate_now().unwrap();

        assert!(temp_dir.path().join("app-notes.log").exists());
        assert!(temp_dir.path().join("other.txt").exists());
        assert_eq!(file.generations().unwrap().len(), 1);
    }
}
