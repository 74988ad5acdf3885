//! Cursor-hiding helper process
//!
//! The exhibit screen must never show a mouse pointer. A small helper
//! (`unclutter` by default) is started against the configured X display
//! and killed again at shutdown.

use std::process::Stdio;

use exhibit_core::config::DisplaySettings;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Handle to the helper process, if one is running
#[derive(Debug)]
pub struct CursorHelper {
    child: Option<Child>,
}

impl CursorHelper {
    /// Start the configured helper
    ///
    /// A missing binary is logged and otherwise ignored.
    pub fn spawn(display: &DisplaySettings) -> Self {
        let Some((program, args)) = display.cursor_helper.split_first() else {
            debug!("No cursor helper configured");
            return Self { child: None };
        };

        let spawned = Command::new(program)
            .args(args)
            .env("DISPLAY", &display.display)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                let display_name = &display.display;
                info!(
                    program = %program,
                    display = %display_name,
                    pid = child.id(),
                    "Cursor helper started"
                );
                Self { child: Some(child) }
            }
            Err(e) => {
                warn!(program = %program, error = %e, "Cursor helper unavailable, continuing without it");
                Self { child: None }
            }
        }
    }

    /// Whether a helper process was started
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Kill the helper and reap it
    pub async fn stop(mut self) {
        if let Some(mut child) = self.child.take() {
            match child.kill().await {
                Ok(()) => debug!("Cursor helper stopped"),
                Err(e) => warn!(error = %e, "Failed to stop cursor helper"),
            }
        }
    }
}
