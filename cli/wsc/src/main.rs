//! wsc CLI: automated web-service composition from the command line.

mod commands;
mod logging;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use commands::compose::PlannerOverrides;
use manifest::WscManifest;

#[derive(Parser)]
#[command(name = "wsc", version, about = "Automated web-service composition planner")]
struct Cli {
    /// Log filter (e.g. info, wsc_planner=debug); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project with a sample repository and request
    Init {
        /// Project name
        name: String,
    },
    /// Compose services for a request
    Compose {
        /// Repository file (repeatable; default: wsc.toml paths or services/)
        #[arg(long = "repository", short = 'r')]
        repositories: Vec<String>,
        /// Request file (default: request.toml)
        #[arg(long)]
        request: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
        /// Print the composition report after the plans
        #[arg(long)]
        report: bool,
        /// Widest search-graph layer to enumerate (default 16, at most 63);
        /// a wider layer fails the run
        #[arg(long)]
        max_layer_width: Option<usize>,
        /// Leave constraints on the services that declared them
        #[arg(long)]
        no_adjust: bool,
        /// Drop plans in which some service's inputs are never provided
        #[arg(long)]
        discard_infeasible: bool,
        /// Drop plans that use the same services as an earlier plan
        #[arg(long)]
        dedupe: bool,
    },
    /// Show the layered search graph for a request
    Graph {
        #[arg(long = "repository", short = 'r')]
        repositories: Vec<String>,
        #[arg(long)]
        request: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Validate repository and request files
    Check {
        #[arg(long = "repository", short = 'r')]
        repositories: Vec<String>,
        #[arg(long)]
        request: Option<String>,
    },
    /// List repository services
    Services {
        #[arg(long = "repository", short = 'r')]
        repositories: Vec<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = load_manifest_optional(&cwd)?;
    let project_dir = project_dir.unwrap_or(cwd);

    let level = cli
        .log_level
        .as_deref()
        .or_else(|| manifest.as_ref().and_then(WscManifest::log_level));
    logging::init(level)?;
    tracing::debug!(
        project_dir = %project_dir.display(),
        manifest = manifest.is_some(),
        "resolved project"
    );

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Compose {
            repositories,
            request,
            format,
            report,
            max_layer_width,
            no_adjust,
            discard_infeasible,
            dedupe,
        } => {
            let overrides = PlannerOverrides {
                max_layer_width,
                no_adjust,
                discard_infeasible,
                dedupe,
            };
            commands::compose::run(
                &project_dir,
                manifest.as_ref(),
                &repositories,
                request.as_deref(),
                format.as_deref(),
                report,
                &overrides,
            )
        }

        Commands::Graph {
            repositories,
            request,
            format,
        } => commands::graph::run(
            &project_dir,
            manifest.as_ref(),
            &repositories,
            request.as_deref(),
            format.as_deref(),
        ),

        Commands::Check {
            repositories,
            request,
        } => commands::check::run(
            &project_dir,
            manifest.as_ref(),
            &repositories,
            request.as_deref(),
        ),

        Commands::Services {
            repositories,
            format,
        } => commands::services::run(
            &project_dir,
            manifest.as_ref(),
            &repositories,
            format.as_deref(),
        ),
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<WscManifest>, Option<PathBuf>)> {
    match WscManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Full workflow: init -> check -> compose -> graph -> services.
    #[test]
    fn init_check_compose_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("workflow");

        commands::init::create_project(&project_path, "workflow").unwrap();

        let (manifest, project_dir) = WscManifest::find_and_load(&project_path).unwrap().unwrap();
        assert_eq!(project_dir, project_path);

        commands::check::run(&project_dir, Some(&manifest), &[], None).unwrap();
        commands::compose::run(
            &project_dir,
            Some(&manifest),
            &[],
            None,
            None,
            true,
            &PlannerOverrides::default(),
        )
        .unwrap();
        commands::graph::run(&project_dir, Some(&manifest), &[], None, Some("json")).unwrap();
        commands::services::run(&project_dir, Some(&manifest), &[], None).unwrap();
    }

    /// The sample project composes into exactly one three-service plan.
    #[test]
    fn sample_project_plan() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("sample");
        commands::init::create_project(&project_path, "sample").unwrap();
        let (manifest, project_dir) = WscManifest::find_and_load(&project_path).unwrap().unwrap();

        let repo = commands::load_project_repository(&project_dir, Some(&manifest), &[]).unwrap();
        let request = commands::load_project_request(&project_dir, Some(&manifest), None).unwrap();
        let composition =
            wsc_planner::compose(&request, repo.services(), &manifest.planner_config()).unwrap();

        let plans = composition.outcome.plans();
        assert_eq!(plans.len(), 1);
        assert_eq!(
            plans[0].to_string(),
            "Layer 0: {} [] LookupCourse {FetchMarks}\n\
             Layer 1: {LookupCourse} [] FetchMarks {ComputePercentage}\n\
             Layer 2: {FetchMarks} [int:Marks >= 0] ComputePercentage {}"
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("fmt");
        commands::init::create_project(&project_path, "fmt").unwrap();
        let err = commands::services::run(&project_path, None, &[], Some("yaml")).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }
}
