//! Composition report aggregating all planner stages.

use std::fmt;

use serde::Serialize;

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u64,
}

/// Summary report of one composition run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    /// SHA-256 of the repository's canonical JSON form.
    pub repository_digest: Option<String>,
    /// Services offered by the repository.
    pub repository_size: usize,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
    pub graph_layers: usize,
    pub graph_nodes: usize,
    pub max_layer_width: usize,
    /// Candidate service sets found by backward search.
    pub plan_sets: usize,
    /// Plan sets that pruned down to a single service.
    pub plans_discarded: usize,
    /// Plans repeating the services of an earlier plan.
    pub plans_duplicated: usize,
    /// Plans with a service whose inputs no earlier plan service provides.
    pub plans_infeasible: usize,
    /// Final constraint-aware plans.
    pub plans: usize,
    pub constraints_adjusted: usize,
    pub constraints_hoisted: usize,
    /// `solved`, or the reason the request is unsolvable.
    pub outcome: String,
    pub stages: Vec<StageTiming>,
}

impl CompositionReport {
    pub(crate) fn record_stage(&mut self, stage: &str, duration_ms: u64) {
        self.stages.push(StageTiming {
            stage: stage.to_string(),
            duration_ms,
        });
    }
}

impl fmt::Display for CompositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Composition Report ===")?;
        if let Some(digest) = &self.repository_digest {
            writeln!(f, "Repository: {} services ({digest})", self.repository_size)?;
        } else {
            writeln!(f, "Repository: {} services", self.repository_size)?;
        }
        writeln!(f, "Duration: {} ms", self.duration_ms)?;
        writeln!(f, "Outcome: {}", self.outcome)?;
        writeln!(f)?;

        writeln!(f, "--- Search Graph ---")?;
        writeln!(
            f,
            "  {} layers, {} services, widest layer {}",
            self.graph_layers, self.graph_nodes, self.max_layer_width
        )?;

        writeln!(f)?;
        writeln!(f, "--- Plans ---")?;
        writeln!(f, "  Plan sets: {}", self.plan_sets)?;
        writeln!(
            f,
            "  Dropped: {} single-service, {} duplicate, {} infeasible",
            self.plans_discarded, self.plans_duplicated, self.plans_infeasible
        )?;
        writeln!(f, "  Final plans: {}", self.plans)?;

        writeln!(f)?;
        writeln!(f, "--- Constraints ---")?;
        writeln!(
            f,
            "  {} adjusted, {} hoisted to start",
            self.constraints_adjusted, self.constraints_hoisted
        )?;

        if !self.stages.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Stages ---")?;
            for timing in &self.stages {
                writeln!(f, "  {}: {} ms", timing.stage, timing.duration_ms)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display() {
        let mut report = CompositionReport {
            repository_digest: Some("abc123".into()),
            repository_size: 6,
            duration_ms: 3,
            graph_layers: 4,
            graph_nodes: 4,
            max_layer_width: 1,
            plan_sets: 1,
            plans: 1,
            outcome: "solved".into(),
            ..CompositionReport::default()
        };
        report.record_stage("forward", 1);

        let output = format!("{report}");
        assert!(output.contains("Composition Report"));
        assert!(output.contains("6 services (abc123)"));
        assert!(output.contains("Outcome: solved"));
        assert!(output.contains("forward: 1 ms"));
        assert!(output.contains("0 single-service, 0 duplicate, 0 infeasible"));
    }

    #[test]
    fn report_serializes() {
        let report = CompositionReport {
            outcome: "no_plans".into(),
            ..CompositionReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "no_plans");
        assert!(json["repository_digest"].is_null());
    }
}
