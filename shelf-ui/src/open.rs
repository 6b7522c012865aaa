//! Open detail links in the default browser.

use std::process::{Command, Stdio};

use shelf::LinkOpener;

use crate::launcher::reap_in_background;

/// Hands URLs to the desktop's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&mut self, url: &str) {
        let mut cmd = open_command();
        cmd.arg(url).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        match cmd.spawn() {
            Ok(child) => {
                tracing::info!(url, "opened link");
                reap_in_background(child, "link-opener");
            }
            Err(e) => tracing::warn!(url, error = %e, "failed to open link"),
        }
    }
}

#[cfg(target_os = "macos")]
fn open_command() -> Command {
    Command::new("open")
}

#[cfg(target_os = "linux")]
fn open_command() -> Command {
    Command::new("xdg-open")
}

#[cfg(target_os = "windows")]
fn open_command() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn open_command() -> Command {
    Command::new("open")
}
