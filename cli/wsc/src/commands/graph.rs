//! `wsc graph`: show the layered search graph for a request.

use std::path::Path;

use anyhow::{Context, Result};
use wsc_core::CompositionRequest;
use wsc_planner::{forward_expansion, Expansion};
use wsc_repository::ServiceRepository;

use crate::commands::{load_project_repository, load_project_request, OutputFormat};
use crate::manifest::WscManifest;

pub fn run(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    repositories: &[String],
    request: Option<&str>,
    format: Option<&str>,
) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let repo = load_project_repository(project_dir, manifest, repositories)?;
    let request = load_project_request(project_dir, manifest, request)?;
    print!("{}", render(&request, &repo, format)?);
    Ok(())
}

pub(crate) fn render(
    request: &CompositionRequest,
    repo: &ServiceRepository,
    format: OutputFormat,
) -> Result<String> {
    let expansion = forward_expansion(request, repo.services()).context("expanding search graph")?;
    let out = match (expansion, format) {
        (Expansion::Reachable(graph), OutputFormat::Text) => format!(
            "{graph}\n\n{} layers, {} services, widest layer {}\n",
            graph.layer_count(),
            graph.node_count(),
            graph.max_layer_width()
        ),
        (Expansion::Reachable(graph), OutputFormat::Json) => {
            serde_json::to_string_pretty(&graph).context("serializing search graph")? + "\n"
        }
        (Expansion::Unsolvable(reason), OutputFormat::Text) => format!("No search graph: {reason}\n"),
        (Expansion::Unsolvable(reason), OutputFormat::Json) => {
            serde_json::to_string_pretty(&reason).context("serializing outcome")? + "\n"
        }
    };
    Ok(out)
}
