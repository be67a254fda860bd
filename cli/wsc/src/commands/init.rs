//! `wsc init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use wsc_repository::{repository_template, request_template};

use crate::manifest::WscManifest;

/// Create a new project in directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("services")).context("creating services/ directory")?;

    fs::write(project_dir.join("wsc.toml"), WscManifest::template(name))
        .context("writing wsc.toml")?;

    let services = repository_template().context("generating sample repository")?;
    fs::write(
        project_dir.join("services").join("students.services.toml"),
        services,
    )
    .context("writing services/students.services.toml")?;

    let request = request_template().context("generating sample request")?;
    fs::write(project_dir.join("request.toml"), request).context("writing request.toml")?;

    println!("Created project '{name}'");
    println!("  {name}/wsc.toml");
    println!("  {name}/services/students.services.toml");
    println!("  {name}/request.toml");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsc_repository::{load_repository, load_request};

    #[test]
    fn init_creates_project_structure() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("demo");

        create_project(&project_path, "demo").unwrap();

        assert!(project_path.join("wsc.toml").is_file());
        assert!(project_path.join("services/students.services.toml").is_file());
        assert!(project_path.join("request.toml").is_file());
    }

    #[test]
    fn init_generates_loadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("loadable");
        create_project(&project_path, "loadable").unwrap();

        let content = fs::read_to_string(project_path.join("wsc.toml")).unwrap();
        let manifest = WscManifest::from_str(&content).unwrap();
        assert_eq!(manifest.project.name, "loadable");

        let repo = load_repository(&project_path.join("services/students.services.toml")).unwrap();
        assert_eq!(repo.len(), 4);
        let request = load_request(&project_path.join("request.toml")).unwrap();
        assert_eq!(request.outputs().len(), 1);
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("existing");
        fs::create_dir(&project_path).unwrap();

        let err = create_project(&project_path, "existing").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
