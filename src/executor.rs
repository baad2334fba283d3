//! Activation of catalog entries: decide what to do, then do it.

use std::process::Command;

use log::{debug, info};

use crate::config::LinkConfig;
use crate::error::{SiftError, SiftResult};
use crate::platform::Application;

/// Prefix of exec strings owned by a plugin rather than the shell.
pub const PLUGIN_PREFIX: &str = "plugin:";

/// The action to perform when an application is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionAction {
    /// Run the exec string through `sh -c`
    RunShellCommand { command: String },

    /// Open a URL in the default browser
    OpenUrl { url: String },

    /// A plugin command; the caller dispatches it
    Plugin { id: String },

    /// Link waiting for query input
    NeedsInput,
}

impl ExecutionAction {
    /// Decide how `app` should be activated.
    ///
    /// `input` is the user's text for links with a replacement placeholder.
    pub fn for_application(
        app: &Application,
        links: &[LinkConfig],
        input: Option<&str>,
    ) -> SiftResult<Self> {
        let exec = app.exec.trim();
        if exec.is_empty() {
            return Err(SiftError::Launch(format!(
                "no executable defined for {}",
                app.name
            )));
        }

        let Some(id) = exec.strip_prefix(PLUGIN_PREFIX) else {
            return Ok(ExecutionAction::RunShellCommand {
                command: exec.to_string(),
            });
        };

        match links.iter().find(|link| link.id() == id) {
            Some(link) => Ok(match link.resolve_url(input) {
                Some(url) => ExecutionAction::OpenUrl { url },
                None => ExecutionAction::NeedsInput,
            }),
            None => Ok(ExecutionAction::Plugin { id: id.to_string() }),
        }
    }
}

/// Spawn the process for `action` without waiting for it.
///
/// `Plugin` and `NeedsInput` have nothing to spawn and return `Ok`.
pub fn execute(action: &ExecutionAction) -> SiftResult<()> {
    match action {
        ExecutionAction::RunShellCommand { command } => {
            info!("Launching: {}", command);
            Command::new("sh")
                .arg("-c")
                .arg(command)
                .spawn()
                .map_err(|e| SiftError::Launch(format!("failed to run {}: {}", command, e)))?;
        }
        ExecutionAction::OpenUrl { url } => {
            info!("Opening URL: {}", url);
            Command::new(opener())
                .arg(url)
                .spawn()
                .map_err(|e| SiftError::Launch(format!("failed to open {}: {}", url, e)))?;
        }
        ExecutionAction::Plugin { id } => debug!("Plugin command {} left to caller", id),
        ExecutionAction::NeedsInput => debug!("Action needs input, nothing launched"),
    }
    Ok(())
}

fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
