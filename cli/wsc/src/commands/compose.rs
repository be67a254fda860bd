//! `wsc compose`: run the planner on a request.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use wsc_core::ConstraintAwarePlan;
use wsc_planner::{
    compose, Composition, CompositionOutcome, CompositionReport, PlannerConfig, Unsolvable,
};

use crate::commands::{load_project_repository, load_project_request, OutputFormat};
use crate::manifest::WscManifest;

/// Planner settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PlannerOverrides {
    pub max_layer_width: Option<usize>,
    pub no_adjust: bool,
    pub discard_infeasible: bool,
    pub dedupe: bool,
}

impl PlannerOverrides {
    pub fn apply(&self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(width) = self.max_layer_width {
            config.max_layer_width = width;
        }
        if self.no_adjust {
            config.adjust_constraints = false;
        }
        if self.discard_infeasible {
            config.discard_infeasible = true;
        }
        if self.dedupe {
            config.dedupe_plans = true;
        }
        config
    }
}

#[derive(Serialize)]
struct ComposeOutput<'a> {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    unsolvable: Option<&'a Unsolvable>,
    /// Canonical rendering of each plan, in plan order.
    rendered: Vec<String>,
    plans: &'a [ConstraintAwarePlan],
    report: &'a CompositionReport,
}

/// Compose services for a request and print the plans.
pub fn run(
    project_dir: &Path,
    manifest: Option<&WscManifest>,
    repositories: &[String],
    request: Option<&str>,
    format: Option<&str>,
    show_report: bool,
    overrides: &PlannerOverrides,
) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let config = overrides.apply(manifest.map(WscManifest::planner_config).unwrap_or_default());
    let repo = load_project_repository(project_dir, manifest, repositories)?;
    let request = load_project_request(project_dir, manifest, request)?;

    let composition = compose(&request, repo.services(), &config).context("composing services")?;
    print!("{}", render(&composition, format, show_report)?);
    Ok(())
}

pub(crate) fn render(
    composition: &Composition,
    format: OutputFormat,
    show_report: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let output = ComposeOutput {
                solved: composition.outcome.is_solved(),
                unsolvable: composition.outcome.unsolvable(),
                rendered: composition.outcome.plans().iter().map(ToString::to_string).collect(),
                plans: composition.outcome.plans(),
                report: &composition.report,
            };
            let mut json = serde_json::to_string_pretty(&output).context("serializing plans")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            match &composition.outcome {
                CompositionOutcome::Solved(plans) => {
                    for (i, plan) in plans.iter().enumerate() {
                        out.push_str(&format!(
                            "Plan {} ({} services):\n{plan}\n\n",
                            i + 1,
                            plan.node_count()
                        ));
                    }
                }
                CompositionOutcome::Unsolvable(reason) => {
                    out.push_str(&format!("No composition: {reason}\n"));
                }
            }
            if show_report {
                out.push_str(&composition.report.to_string());
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsc_core::CompositionRequest;
    use wsc_repository::{parse_repository, Format};

    const REPO: &str = r#"
[[service]]
name = "W8"
inputs = ["string:StudentID"]
outputs = ["string:CourseID"]

[[service]]
name = "W9"
inputs = ["string:CourseID"]
outputs = ["int:Marks"]

[[service]]
name = "W10"
inputs = ["int:Marks"]
outputs = ["float:MarksPercentage"]
"#;

    fn student_composition() -> Composition {
        let repo = parse_repository(REPO, Format::Toml).unwrap();
        let request = CompositionRequest::new(
            ["string:StudentID"],
            ["float:MarksPercentage"],
            Vec::<&str>::new(),
            Vec::<&str>::new(),
        )
        .unwrap();
        compose(&request, repo.services(), &PlannerConfig::default()).unwrap()
    }

    #[test]
    fn text_output_lists_plans() {
        let text = render(&student_composition(), OutputFormat::Text, false).unwrap();
        assert!(text.starts_with("Plan 1 (3 services):\nLayer 0: {} [] W8 {W9}\n"));
        assert!(!text.contains("Composition Report"));

        let with_report = render(&student_composition(), OutputFormat::Text, true).unwrap();
        assert!(with_report.contains("=== Composition Report ==="));
    }

    #[test]
    fn json_output_carries_plans_and_report() {
        let json = render(&student_composition(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["solved"], true);
        assert!(value.get("unsolvable").is_none());
        assert_eq!(value["plans"].as_array().unwrap().len(), 1);
        assert_eq!(value["report"]["plans"], 1);
        assert!(value["rendered"][0].as_str().unwrap().contains("W10"));
    }

    #[test]
    fn overrides_apply_over_config() {
        let overrides = PlannerOverrides {
            max_layer_width: Some(4),
            no_adjust: true,
            discard_infeasible: false,
            dedupe: true,
        };
        let config = overrides.apply(PlannerConfig::default());
        assert_eq!(config.max_layer_width, 4);
        assert!(!config.adjust_constraints);
        assert!(!config.discard_infeasible);
        assert!(config.dedupe_plans);

        let untouched = PlannerOverrides::default().apply(PlannerConfig::default());
        assert_eq!(untouched, PlannerConfig::default());
    }

    #[test]
    fn run_against_project_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("services")).unwrap();
        std::fs::write(dir.path().join("services/student.services.toml"), REPO).unwrap();
        std::fs::write(
            dir.path().join("request.toml"),
            "inputs = [\"string:StudentID\"]\noutputs = [\"float:MarksPercentage\"]\n",
        )
        .unwrap();

        let defaults = PlannerOverrides::default();
        run(dir.path(), None, &[], None, Some("json"), false, &defaults).unwrap();
        let err = run(dir.path(), None, &[], Some("missing.toml"), None, false, &defaults).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
