use std::process::{Command, Stdio};

use tracing::debug;

use crate::dispatch::ProcessLauncher;
use crate::error::LinkError;

/// Starts detached processes on the local machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, command: &str, args: &[String]) -> Result<(), LinkError> {
        debug!(command, ?args, "spawning");

        Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|err| LinkError::LaunchFailed {
                command: command.to_string(),
                reason: err.to_string(),
            })
    }

    fn open_default(&self, target: &str) -> Result<(), LinkError> {
        debug!(target_path = target, "opening with system handler");

        open::that_detached(target).map_err(|err| LinkError::LaunchFailed {
            command: format!("open {target}"),
            reason: err.to_string(),
        })
    }
}
