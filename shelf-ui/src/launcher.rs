//! Starting the external emulator.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::library::has_rom_extension;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("No emulator path specified")]
    NoEmulator,

    #[error("ROM file does not exist: {}", .0.display())]
    MissingRom(PathBuf),

    #[error("Invalid ROM file type: {}", .0.display())]
    InvalidRom(PathBuf),

    #[error("Failed to launch emulator {emulator}: {source}")]
    Spawn {
        emulator: String,
        #[source]
        source: io::Error,
    },
}

/// Runs ROMs in an emulator executable.
#[derive(Debug, Clone)]
pub struct EmulatorLauncher {
    emulator: String,
}

impl EmulatorLauncher {
    pub fn new(emulator: impl Into<String>) -> Result<Self, LaunchError> {
        let emulator = emulator.into();
        if emulator.trim().is_empty() {
            return Err(LaunchError::NoEmulator);
        }
        Ok(Self { emulator })
    }

    /// Check that `rom` is an existing `.nes` file.
    pub fn validate_rom(&self, rom: &Path) -> Result<(), LaunchError> {
        if !rom.exists() {
            return Err(LaunchError::MissingRom(rom.to_path_buf()));
        }
        if !rom.is_file() || !has_rom_extension(rom) {
            return Err(LaunchError::InvalidRom(rom.to_path_buf()));
        }
        Ok(())
    }

    /// Start the emulator on `rom` without waiting for it to exit.
    pub fn launch(&self, rom: &Path) -> Result<(), LaunchError> {
        self.validate_rom(rom)?;

        let child = Command::new(&self.emulator)
            .arg(rom)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                emulator: self.emulator.clone(),
                source,
            })?;

        tracing::info!(emulator = %self.emulator, rom = %rom.display(), pid = child.id(), "launched emulator");
        reap_in_background(child, "emulator");
        Ok(())
    }
}

/// Wait for `child` on a detached thread so its exit status is collected
/// while the launcher keeps running.
pub(crate) fn reap_in_background(mut child: Child, what: &'static str) -> Option<JoinHandle<()>> {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name(format!("reap-{what}"))
        .spawn(move || match child.wait() {
            Ok(status) => tracing::debug!(what, pid, %status, "child exited"),
            Err(e) => tracing::warn!(what, pid, error = %e, "failed to wait for child"),
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(what, pid, error = %e, "failed to start reaper thread");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_emulator_path_is_rejected() {
        let err = EmulatorLauncher::new("  ").unwrap_err();
        assert_eq!(err.to_string(), "No emulator path specified");
    }

    #[test]
    fn missing_rom_is_reported() {
        let launcher = EmulatorLauncher::new("nestopia").unwrap();
        let err = launcher.validate_rom(Path::new("/nonexistent/contra.nes")).unwrap_err();
        assert_eq!(err.to_string(), "ROM file does not exist: /nonexistent/contra.nes");
    }

    #[test]
    fn wrong_extension_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("readme.txt");
        fs::write(&rom, b"").unwrap();

        let launcher = EmulatorLauncher::new("nestopia").unwrap();
        assert!(matches!(launcher.validate_rom(&rom), Err(LaunchError::InvalidRom(_))));
    }

    #[test]
    fn valid_rom_passes() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("contra.nes");
        fs::write(&rom, b"NES\x1a").unwrap();

        let launcher = EmulatorLauncher::new("nestopia").unwrap();
        assert!(launcher.validate_rom(&rom).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn finished_child_is_reaped() {
        let child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        reap_in_background(child, "test").unwrap().join().unwrap();

        // A reaped pid no longer has a /proc entry; a zombie would.
        let status = fs::read_to_string(format!("/proc/{pid}/status")).unwrap_or_default();
        assert!(!status.contains("State:\tZ"), "pid {pid} left as a zombie");
    }

    #[test]
    fn unknown_emulator_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("contra.nes");
        fs::write(&rom, b"").unwrap();

        let launcher = EmulatorLauncher::new("/nonexistent/emulator-binary").unwrap();
        let err = launcher.launch(&rom).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().starts_with("Failed to launch emulator"));
    }
}
