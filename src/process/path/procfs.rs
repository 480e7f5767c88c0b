//! procfs-backed introspection
//!
//! Tier mapping on Linux:
//! - module info: the `exe` link of the process
//! - native buffer: the first `cmdline` argument, read into a bounded buffer
//!   and accepted only when its file name matches the process name
//! - management: a scan of `maps` for the executable image mapping

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::introspector::{ProcessIdentity, ProcessIntrospector};
use crate::error::{GovernorError, GovernorResult};

/// Kernel truncates `comm` names to this many bytes
const COMM_NAME_LEN: usize = 15;

const DELETED_SUFFIX: &str = " (deleted)";

#[derive(Debug, Clone)]
pub struct ProcfsIntrospector {
    root: PathBuf,
}

impl Default for ProcfsIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsIntrospector {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Read from a procfs mount other than `/proc`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn process_dir(&self, pid: i32) -> GovernorResult<PathBuf> {
        if pid <= 0 {
            return Err(GovernorError::invalid_argument(format!("pid {}", pid)));
        }
        Ok(self.root.join(pid.to_string()))
    }
}

/// Whether an image file name belongs to a process called `name`
fn name_matches(file_name: &str, name: &str) -> bool {
    file_name == name || (name.len() >= COMM_NAME_LEN && file_name.starts_with(name))
}

fn strip_deleted(path: &str) -> &str {
    path.strip_suffix(DELETED_SUFFIX).unwrap_or(path)
}

/// Path column of an executable `maps` line
fn executable_mapping(line: &str) -> Option<&str> {
    let mut fields = line.splitn(6, char::is_whitespace);
    let _range = fields.next()?;
    let perms = fields.next()?;
    if !perms.contains('x') {
        return None;
    }
    let pathname = fields.nth(3)?.trim_start();
    pathname.starts_with('/').then(|| strip_deleted(pathname))
}

impl ProcessIntrospector for ProcfsIntrospector {
    fn module_file_name(&self, process: &ProcessIdentity) -> GovernorResult<PathBuf> {
        let link = fs::read_link(self.process_dir(process.pid)?.join("exe"))?;
        match link.to_str() {
            Some(text) => Ok(PathBuf::from(strip_deleted(text))),
            None => Ok(link),
        }
    }

    fn image_file_name(&self, process: &ProcessIdentity, capacity: usize) -> GovernorResult<PathBuf> {
        let file = File::open(self.process_dir(process.pid)?.join("cmdline"))?;

        let mut buffer = Vec::with_capacity(capacity.min(4096));
        file.take(capacity as u64).read_to_end(&mut buffer)?;

        let first = buffer.split(|byte| *byte == 0).next().unwrap_or_default();
        let text = std::str::from_utf8(first)
            .map_err(|_| GovernorError::Io("cmdline is not valid UTF-8".to_string()))?;

        // Kernel threads have no cmdline; relative argv[0] is not a path.
        if text.is_empty() || !Path::new(text).is_absolute() {
            return Err(GovernorError::NotFound);
        }

        // argv[0] is writable by the process; only trust it when it names
        // the same image.
        let file_name = Path::new(text)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if !name_matches(file_name, &process.name) {
            log::trace!(
                "cmdline of pid {} names {} instead of {}",
                process.pid,
                file_name,
                process.name
            );
            return Err(GovernorError::NotFound);
        }
        Ok(PathBuf::from(text))
    }

    fn management_query(
        &self,
        process: &ProcessIdentity,
        timeout: Duration,
    ) -> GovernorResult<PathBuf> {
        let started = Instant::now();
        let reader = BufReader::new(File::open(self.process_dir(process.pid)?.join("maps"))?);

        let mut first_executable: Option<String> = None;
        for line in reader.lines() {
            if started.elapsed() > timeout {
                return Err(GovernorError::Timeout(timeout));
            }

            let line = line?;
            let Some(pathname) = executable_mapping(&line) else {
                continue;
            };

            let file_name = Path::new(pathname)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            if name_matches(file_name, &process.name) {
                return Ok(PathBuf::from(pathname));
            }
            if first_executable.is_none() {
                first_executable = Some(pathname.to_string());
            }
        }

        first_executable
            .map(PathBuf::from)
            .ok_or(GovernorError::NotFound)
    }
}
