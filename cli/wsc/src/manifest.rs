//! `wsc.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wsc_planner::PlannerConfig;

/// The top-level manifest structure for a wsc project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WscManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Planner settings; missing keys keep their defaults.
    #[serde(default)]
    pub planner: Option<PlannerConfig>,
    /// Default input files.
    #[serde(default)]
    pub paths: Option<PathsConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Default repository and request files, relative to the project directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Repository files; when empty, `services/` is searched.
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub request: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `wsc_planner=debug`.
    #[serde(default)]
    pub level: Option<String>,
}

impl WscManifest {
    /// Search upward from `start_dir` for a `wsc.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("wsc.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: WscManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing wsc.toml")
    }

    /// Planner configuration with manifest overrides applied.
    pub fn planner_config(&self) -> PlannerConfig {
        self.planner.clone().unwrap_or_default()
    }

    pub fn repository_paths(&self) -> &[String] {
        self.paths
            .as_ref()
            .map(|p| p.repositories.as_slice())
            .unwrap_or(&[])
    }

    pub fn request_path(&self) -> Option<&str> {
        self.paths.as_ref().and_then(|p| p.request.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Generate the default template for `wsc init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[planner]
max_layer_width = 16
adjust_constraints = true
discard_infeasible = false
dedupe_plans = false

[paths]
request = "request.toml"

[logging]
level = "warn"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[project]
name = "travel"
version = "1.2.0"
description = "Trip booking compositions"

[planner]
max_layer_width = 8
adjust_constraints = false
dedupe_plans = true

[paths]
repositories = ["services/air.services.toml", "services/hotel.services.json"]
request = "requests/trip.toml"

[logging]
level = "wsc_planner=debug"
"#;
        let manifest = WscManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.name, "travel");
        let config = manifest.planner_config();
        assert_eq!(config.max_layer_width, 8);
        assert!(!config.adjust_constraints);
        assert!(!config.discard_infeasible);
        assert!(config.dedupe_plans);
        assert_eq!(manifest.repository_paths().len(), 2);
        assert_eq!(manifest.request_path(), Some("requests/trip.toml"));
        assert_eq!(manifest.log_level(), Some("wsc_planner=debug"));
    }

    #[test]
    fn parse_minimal_manifest() {
        let manifest = WscManifest::from_str("[project]\nname = \"minimal\"\n").unwrap();
        assert_eq!(manifest.project.version, "0.1.0");
        assert_eq!(manifest.planner_config(), PlannerConfig::default());
        assert!(manifest.repository_paths().is_empty());
        assert!(manifest.request_path().is_none());
        assert!(manifest.log_level().is_none());
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(WscManifest::from_str("this is not valid toml [[[").is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let manifest = WscManifest::from_str(&WscManifest::template("demo")).unwrap();
        assert_eq!(manifest.project.name, "demo");
        assert_eq!(manifest.planner_config(), PlannerConfig::default());
        assert_eq!(manifest.request_path(), Some("request.toml"));
        assert_eq!(manifest.log_level(), Some("warn"));
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wsc.toml"), "[project]\nname = \"parent\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found_dir) = WscManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.project.name, "parent");
        assert_eq!(found_dir, dir.path());
    }
}
