// gametail - platform/process.rs
//
// Producer process discovery.
//
// The OS process table sits behind the `ProcessTable` trait. The production
// implementation uses `sysinfo`; tests substitute a scripted table.
//
// Scan failures never propagate past `ProcessLocator::find_process`: a failed
// scan is logged and reported as "not found", and the caller polls again.
//
// Install-layout coupling: the log is assumed to live two directory levels
// above the executable file (`<root>/Bin64/StarCitizen.exe` ->
// `<root>/Game.log`). If the producer ever changes that layout the tailer
// simply never finds the file.

use crate::core::model::ProcessHandle;
use crate::util::error::LocatorError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// Read-only view of the running processes.
pub trait ProcessTable: Send + Sync {
    /// Enumerate the live process table once.
    fn snapshot(&self) -> Result<Vec<ProcessHandle>, LocatorError>;
}

// =============================================================================
// sysinfo-backed table
// =============================================================================

/// Process table backed by the OS via `sysinfo`.
///
/// The `System` is kept between scans to reuse its allocations; every scan
/// refreshes it and drops processes that have exited, so results are never
/// stale across a producer restart.
pub struct SystemProcessTable {
    system: Mutex<System>,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn snapshot(&self) -> Result<Vec<ProcessHandle>, LocatorError> {
        let mut system = self.system.lock().map_err(|_| LocatorError::ScanFailed {
            reason: "process table lock poisoned".to_string(),
        })?;

        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );

        Ok(system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessHandle {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                executable_path: process.exe().map(Path::to_path_buf),
            })
            .collect())
    }
}

// =============================================================================
// Locator
// =============================================================================

/// Finds the producer process and derives its log path.
#[derive(Clone)]
pub struct ProcessLocator {
    table: Arc<dyn ProcessTable>,
    log_file_name: String,
}

impl ProcessLocator {
    /// `log_file_name` is joined onto the grandparent of the executable.
    pub fn new(table: Arc<dyn ProcessTable>, log_file_name: impl Into<String>) -> Self {
        Self {
            table,
            log_file_name: log_file_name.into(),
        }
    }

    /// Scan the process table once for an exact, case-sensitive name match.
    ///
    /// Returns the first match. A failed scan is treated as "not found".
    pub fn find_process(&self, target_name: &str) -> Option<ProcessHandle> {
        match self.table.snapshot() {
            Ok(processes) => processes.into_iter().find(|p| p.name == target_name),
            Err(e) => {
                tracing::debug!(
                    target_name,
                    error = %e,
                    "Process scan failed; treating as not found"
                );
                None
            }
        }
    }

    /// Expected log path for a located process, if its executable is known
    /// and deep enough.
    pub fn derive_log_path(&self, handle: &ProcessHandle) -> Option<PathBuf> {
        derive_log_path(handle.executable_path.as_deref()?, &self.log_file_name)
    }
}

/// `parent(parent(exe)) / file_name`, or `None` when `exe` has fewer than two
/// ancestor directories.
pub fn derive_log_path(exe: &Path, file_name: &str) -> Option<PathBuf> {
    let install_root = exe.parent()?.parent()?;
    if install_root.as_os_str().is_empty() {
        return None;
    }
    Some(install_root.join(file_name))
}
