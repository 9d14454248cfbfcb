//! Log directory fixtures.

use anyhow::Result;
use filetime::FileTime;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary log directory that agents "write" into.
///
/// # Example
/// ```no_run
/// use corral_testing::LogFixture;
///
/// let logs = LogFixture::new();
/// let path = logs.agent_log("claude", "api");
/// logs.append(&path, "||STATUS: Working||\n").unwrap();
/// ```
pub struct LogFixture {
    dir: TempDir,
}

impl Default for LogFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp log dir"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    /// Path of `{type}_corral_{token}.log` inside the fixture. The file is
    /// not created.
    pub fn agent_log(&self, agent_type: &str, token: &str) -> PathBuf {
        corral_panes::naming::log_path(
            self.dir.path(),
            agent_type,
            corral_panes::naming::DEFAULT_SCOPE,
            token,
        )
    }

    /// Create or replace `file_name` with `content`.
    pub fn write(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Append to a log file, creating it if needed.
    pub fn append(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Cut a log file back to `len` bytes, as a pane clear or rotation would.
    pub fn truncate(&self, path: &Path, len: u64) -> Result<()> {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(len)?;
        Ok(())
    }

    pub fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)?;
        Ok(())
    }

    /// Backdate the file's modification time by `age`.
    pub fn age(&self, path: &Path, age: Duration) -> Result<()> {
        let mtime = SystemTime::now()
            .checked_sub(age)
            .ok_or_else(|| anyhow::anyhow!("age {:?} is before the epoch", age))?;
        filetime::set_file_mtime(path, FileTime::from_system_time(mtime))?;
        Ok(())
    }
}
