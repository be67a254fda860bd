//! `wsc check`: validate repository and request files without planning.

use std::path::Path;

use anyhow::{bail, Context, Result};
use wsc_repository::{
    load_request, parse_repository, validate_repository, Format, ServiceRepository,
    ValidationIssue,
};

use crate::commands::{repository_paths, request_path};
use crate::manifest::WscManifest;

pub fn run(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    repositories: &[String],
    request: Option<&str>,
) -> Result<()> {
    let mut errors = 0;
    let mut merged = ServiceRepository::new();

    for path in repository_paths(project_dir, manifest, repositories)? {
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let repo = parse_repository(&content, Format::from_path(&path))
            .with_context(|| format!("parsing {}", path.display()))?;
        let issues = validate_repository(&repo).err().unwrap_or_default();
        errors += report_issues(&path, &issues);
        println!("{}: {} services", path.display(), repo.len());
        if let Err(e) = merged.merge(repo) {
            println!("  error: {e}");
            errors += 1;
        }
    }

    let request_file = request_path(project_dir, manifest, request);
    if request_file.exists() {
        match load_request(&request_file) {
            Ok(req) => println!(
                "{}: {} inputs, {} outputs, {} constraints",
                request_file.display(),
                req.inputs().len(),
                req.outputs().len(),
                req.constraints().len()
            ),
            Err(e) => {
                println!("{}: error: {e}", request_file.display());
                errors += 1;
            }
        }
    } else if request.is_some() {
        bail!("request file not found: {}", request_file.display());
    }

    println!(
        "repository digest: {}",
        merged.digest().context("hashing repository")?
    );
    if errors > 0 {
        bail!("{errors} error(s) found");
    }
    println!("ok");
    Ok(())
}

/// Print issues under their file and return how many are errors.
fn report_issues(path: &Path, issues: &[ValidationIssue]) -> usize {
    for issue in issues {
        println!("{}: {}: {}", path.display(), issue.severity, issue.message);
    }
    issues.iter().filter(|i| i.is_error()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(repo: &str, request: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("services")).unwrap();
        std::fs::write(dir.path().join("services/main.services.toml"), repo).unwrap();
        std::fs::write(dir.path().join("request.toml"), request).unwrap();
        dir
    }

    const GOOD_REPO: &str = "[[service]]\nname = \"A\"\ninputs = [\"in\"]\noutputs = [\"out\"]\n";
    const GOOD_REQUEST: &str = "inputs = [\"in\"]\noutputs = [\"out\"]\n";

    #[test]
    fn valid_project_passes() {
        let dir = project(GOOD_REPO, GOOD_REQUEST);
        run(dir.path(), None, &[], None).unwrap();
    }

    #[test]
    fn repository_errors_fail_the_check() {
        let dir = project("[[service]]\nname = \"A\"\ninputs = [\"in\"]\n", GOOD_REQUEST);
        let err = run(dir.path(), None, &[], None).unwrap_err();
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn request_errors_fail_the_check() {
        let dir = project(GOOD_REPO, "inputs = []\noutputs = [\"out\"]\n");
        assert!(run(dir.path(), None, &[], None).is_err());
    }

    #[test]
    fn explicit_missing_request_is_an_error() {
        let dir = project(GOOD_REPO, GOOD_REQUEST);
        let err = run(dir.path(), None, &[], Some("/nonexistent/request.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
