//! `wsc services`: list the services of a repository.

use std::path::Path;

use anyhow::{Context, Result};
use wsc_core::Parameter;
use wsc_repository::ServiceRepository;

use crate::commands::{load_project_repository, OutputFormat};
use crate::manifest::WscManifest;

pub fn run(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    repositories: &[String],
    format: Option<&str>,
) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let repo = load_project_repository(project_dir, manifest, repositories)?;
    print!("{}", render(&repo, format)?);
    Ok(())
}

fn join<'a>(params: impl IntoIterator<Item = &'a Parameter>) -> String {
    params
        .into_iter()
        .map(Parameter::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn render(repo: &ServiceRepository, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(repo).context("serializing repository")? + "\n");
    }

    let mut out = String::new();
    for service in repo.iter() {
        out.push_str(&format!(
            "{}: ({}) -> ({})\n",
            service.name,
            join(&service.inputs),
            join(&service.outputs)
        ));
        if !service.effects.is_empty() {
            out.push_str(&format!("  effects: {}\n", join(&service.effects)));
        }
        for constraint in &service.constraints {
            out.push_str(&format!("  constraint: {constraint}\n"));
        }
    }
    out.push_str(&format!("{} services\n", repo.len()));
    Ok(out)
}
