//! CLI command implementations.

pub mod check;
pub mod compose;
pub mod graph;
pub mod init;
pub mod services;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;
use wsc_core::CompositionRequest;
use wsc_repository::{discover_repositories, load_repositories, load_request, ServiceRepository};

use crate::manifest::WscManifest;

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.unwrap_or("text") {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown format '{other}' (expected text or json)"),
        }
    }
}

/// Repository files to load, in priority order: `--repository` flags, the
/// manifest's `[paths] repositories`, then every file in `services/`.
pub fn repository_paths(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    flags: &[String],
) -> Result<Vec<PathBuf>> {
    if !flags.is_empty() {
        return Ok(flags.iter().map(PathBuf::from).collect());
    }
    if let Some(paths) = manifest.map(WscManifest::repository_paths) {
        if !paths.is_empty() {
            return Ok(paths.iter().map(|p| project_dir.join(p)).collect());
        }
    }
    let discovered = discover_repositories(project_dir)
        .with_context(|| format!("searching {}", project_dir.join("services").display()))?;
    if discovered.is_empty() {
        bail!(
            "no service repository found: pass --repository or add files to {}",
            project_dir.join("services").display()
        );
    }
    Ok(discovered.into_iter().map(|(_, path)| path).collect())
}

/// Load and merge the repository files chosen by [`repository_paths`].
pub fn load_project_repository(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    flags: &[String],
) -> Result<ServiceRepository> {
    let paths = repository_paths(project_dir, manifest, flags)?;
    debug!(files = paths.len(), "loading repositories");
    load_repositories(&paths).with_context(|| {
        let shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        format!("loading repository {}", shown.join(", "))
    })
}

/// Request file to load: `--request`, the manifest's `[paths] request`, or
/// `request.toml` in the project directory.
pub fn request_path(project_dir: &Path, manifest: Option<&WscManifest>, flag: Option<&str>) -> PathBuf {
    match flag {
        Some(path) => PathBuf::from(path),
        None => project_dir.join(
            manifest
                .and_then(WscManifest::request_path)
                .unwrap_or("request.toml"),
        ),
    }
}

pub fn load_project_request(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    flag: Option<&str>,
) -> Result<CompositionRequest> {
    let path = request_path(project_dir, manifest, flag);
    load_request(&path).with_context(|| format!("loading request {}", path.display()))
}
