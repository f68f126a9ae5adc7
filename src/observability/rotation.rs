//! Size-based log file rotation.
//!
//! The active file keeps its configured name. Rotated files sit next to it
//! as `<stem>-<unix millis>.<ext>` and are pruned by age and count. Only
//! names carrying a full millisecond stamp count as rotated files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::LogSettings;

const MIB: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);
/// Millisecond stamps have had 13 digits since 2001.
const MIN_STAMP_DIGITS: usize = 13;

/// Limits applied to the active file and its backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_backups: usize,
    pub max_age: Duration,
}

impl From<&LogSettings> for RotationPolicy {
    fn from(settings: &LogSettings) -> Self {
        Self {
            max_bytes: settings.max_size.saturating_mul(MIB),
            max_backups: usize::try_from(settings.max_backups).unwrap_or(usize::MAX),
            max_age: DAY.saturating_mul(u32::try_from(settings.max_days).unwrap_or(u32::MAX)),
        }
    }
}

/// Append-only writer that rotates once the size limit would be passed.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Open (or create) the active file, creating parent directories.
    pub fn open(path: &Path, policy: RotationPolicy) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = open_append(path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            policy,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotated files, oldest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.stamped_backups()?.into_iter().map(|(_, p)| p).collect())
    }

    /// Move the active file aside and start a fresh one.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        // stamps must keep increasing even when rotations share a millisecond
        let newest = self.stamped_backups()?.last().map(|(stamp, _)| stamp + 1);
        let stamp = newest.map_or(now_millis(), |next| next.max(now_millis()));
        fs::rename(&self.path, self.backup_path(stamp))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        self.prune()
    }

    fn prune(&self) -> io::Result<()> {
        let backups = self.stamped_backups()?;
        let now = now_millis();
        let max_age = u64::try_from(self.policy.max_age.as_millis()).unwrap_or(u64::MAX);
        let excess = backups.len().saturating_sub(self.policy.max_backups);

        for (i, (stamp, path)) in backups.iter().enumerate() {
            let expired = now.saturating_sub(*stamp) > max_age;
            if i < excess || expired {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn stem_and_ext(&self) -> (String, Option<String>) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|s| s.to_string_lossy().into_owned());
        (stem, ext)
    }

    fn backup_path(&self, stamp: u64) -> PathBuf {
        let (stem, ext) = self.stem_and_ext();
        let name = match ext {
            Some(ext) => format!("{}-{}.{}", stem, stamp, ext),
            None => format!("{}-{}", stem, stamp),
        };
        self.path.with_file_name(name)
    }

    fn stamped_backups(&self) -> io::Result<Vec<(u64, PathBuf)>> {
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{}-", stem);
        let suffix = ext.map(|e| format!(".{}", e)).unwrap_or_default();
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut found = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let stamp = name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .filter(|digits| {
                    digits.len() >= MIN_STAMP_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
                })
                .and_then(|digits| digits.parse::<u64>().ok());
            if let Some(stamp) = stamp {
                found.push((stamp, entry.path()));
            }
        }
        found.sort();
        Ok(found)
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let incoming = buf.len() as u64;
        if self.written > 0 && self.written.saturating_add(incoming) > self.policy.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
