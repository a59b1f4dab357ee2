use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Project to list the GSA's roles on: the flag, else gcloud's configured project.
pub fn determine_project(flag: Option<&str>) -> Result<String> {
    if let Some(project) = flag.filter(|p| !p.is_empty()) {
        return Ok(project.to_string());
    }
    let mut cmd = Command::new("gcloud");
    cmd.args(["config", "get-value", "core/project"]);
    debug!("Executing command: {:?}", cmd);

    let output = cmd
        .output()
        .context("Failed to execute gcloud config get-value core/project")?;
    if !output.status.success() {
        bail!(
            "gcloud config get-value core/project failed with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    parse_project(&String::from_utf8_lossy(&output.stdout))
}

fn parse_project(stdout: &str) -> Result<String> {
    match stdout.trim() {
        "" | "(unset)" => {
            bail!("no project given and gcloud has no core/project set, please specify -project")
        }
        project => Ok(project.to_string()),
    }
}
