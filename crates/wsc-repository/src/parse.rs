//! TOML/JSON parsing, serialization, and discovery for repositories and requests.
//!
//! Service repositories are stored as `.services.toml` (or `.services.json`)
//! files in the `services/` directory of a project. Each file holds a list of
//! `[[service]]` tables; constraints are written in their textual form,
//! `<parameter> <operator> <literal>`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wsc_core::{Constraint, CompositionRequest, Service};

use crate::error::{RepositoryError, Result};
use crate::repository::{validate_repository, ServiceRepository};

/// On-disk file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServiceFile {
    #[serde(default, rename = "service")]
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServiceEntry {
    name: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<String>,
}

impl ServiceEntry {
    fn into_service(self) -> Result<Service> {
        let mut service = Service::new(self.name.trim())
            .with_inputs(self.inputs)
            .with_outputs(self.outputs)
            .with_effects(self.effects);
        for text in &self.constraints {
            let constraint =
                Constraint::parse(text).map_err(|source| RepositoryError::InvalidConstraint {
                    service: service.name.clone(),
                    source,
                })?;
            service = service.with_constraint(constraint);
        }
        Ok(service)
    }

    fn from_service(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            inputs: strings(&service.inputs),
            outputs: strings(&service.outputs),
            effects: strings(&service.effects),
            constraints: strings(&service.constraints),
        }
    }
}

fn strings<'a, T, I>(items: I) -> Vec<String>
where
    T: ToString + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(ToString::to_string).collect()
}

/// Textual form of a composition request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RequestFile {
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    qos: Vec<String>,
    #[serde(default)]
    constraints: Vec<String>,
}

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RepositoryError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a repository from a string, without validating it.
pub fn parse_repository(content: &str, format: Format) -> Result<ServiceRepository> {
    let file: ServiceFile = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    let services = file
        .services
        .into_iter()
        .map(ServiceEntry::into_service)
        .collect::<Result<Vec<_>>>()?;
    ServiceRepository::from_services(services)
}

/// Load and validate a repository file.
///
/// Validation errors fail the load; warnings are logged.
pub fn load_repository(path: &Path) -> Result<ServiceRepository> {
    let content = read(path)?;
    let repo = parse_repository(&content, Format::from_path(path))?;
    check(&repo)?;
    debug!(path = %path.display(), services = repo.len(), "loaded repository");
    Ok(repo)
}

/// Load several repository files into one, in order.
pub fn load_repositories<P: AsRef<Path>>(paths: &[P]) -> Result<ServiceRepository> {
    let mut merged = ServiceRepository::new();
    for path in paths {
        merged.merge(load_repository(path.as_ref())?)?;
    }
    Ok(merged)
}

fn check(repo: &ServiceRepository) -> Result<()> {
    if let Err(issues) = validate_repository(repo) {
        let mut errors = Vec::new();
        for issue in issues {
            if issue.is_error() {
                errors.push(issue.message);
            } else {
                warn!("{}", issue.message);
            }
        }
        if !errors.is_empty() {
            return Err(RepositoryError::Validation {
                detail: errors.join("; "),
            });
        }
    }
    Ok(())
}

/// Serialize a repository to pretty TOML.
///
/// The TOML format has no place for a nested plan, so composite services
/// are rejected rather than written as plain ones.
pub fn repository_to_toml(repo: &ServiceRepository) -> Result<String> {
    if let Some(composite) = repo.iter().find(|s| s.is_composite()) {
        return Err(RepositoryError::Validation {
            detail: format!(
                "composite service '{}' cannot be written to a TOML repository",
                composite.name
            ),
        });
    }
    let file = ServiceFile {
        services: repo.iter().map(|s| ServiceEntry::from_service(s)).collect(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

/// Parse and validate a request from a string.
pub fn parse_request(content: &str, format: Format) -> Result<CompositionRequest> {
    let file: RequestFile = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(CompositionRequest::new(
        file.inputs,
        file.outputs,
        file.qos,
        file.constraints,
    )?)
}

/// Load and validate a request file.
pub fn load_request(path: &Path) -> Result<CompositionRequest> {
    let content = read(path)?;
    parse_request(&content, Format::from_path(path))
}

/// Serialize a request to pretty TOML.
pub fn request_to_toml(request: &CompositionRequest) -> Result<String> {
    let file = RequestFile {
        inputs: strings(request.inputs()),
        outputs: strings(request.outputs()),
        qos: strings(request.qos()),
        constraints: strings(request.constraints()),
    };
    Ok(toml::to_string_pretty(&file)?)
}

/// A sample repository: a student-records chain plus an unrelated service.
pub fn repository_template() -> Result<String> {
    let repo = ServiceRepository::from_services(vec![
        Service::new("LookupCourse")
            .with_inputs(["string:StudentID"])
            .with_outputs(["string:CourseID"]),
        Service::new("FetchMarks")
            .with_inputs(["string:CourseID"])
            .with_outputs(["int:Marks"])
            .with_effects(["int:Marks"]),
        Service::new("ComputePercentage")
            .with_inputs(["int:Marks"])
            .with_outputs(["float:MarksPercentage"])
            .with_constraint(Constraint::new(
                "int:Marks",
                wsc_core::Operator::GreaterThanOrEqualTo,
                "0",
            )),
        Service::new("PayrollLookup")
            .with_inputs(["string:EmployeeID"])
            .with_outputs(["float:Salary"]),
    ])?;
    repository_to_toml(&repo)
}

/// A sample request matching [`repository_template`].
pub fn request_template() -> Result<String> {
    let request = CompositionRequest::new(
        ["string:StudentID"],
        ["float:MarksPercentage"],
        ["RESPONSE_TIME"],
        ["RESPONSE_TIME < 500"],
    )?;
    request_to_toml(&request)
}

/// Discover all repository files in a project's `services/` directory.
///
/// Returns (repository name, file path) pairs sorted by name.
pub fn discover_repositories(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let services_dir = project_dir.join("services");
    if !services_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&services_dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = file_name
            .strip_suffix(".services.toml")
            .or_else(|| file_name.strip_suffix(".services.json"));
        if let Some(name) = name {
            found.push((name.to_string(), path.clone()));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsc_core::{ConstraintAwarePlan, Operator, Parameter, QosFeature};

    const STUDENT_TOML: &str = r#"
[[service]]
name = "W8"
inputs = ["string:StudentID"]
outputs = ["string:CourseID"]

[[service]]
name = "W9"
inputs = ["string:CourseID"]
outputs = ["int:Marks"]
effects = ["int:Marks"]

[[service]]
name = "W10"
inputs = ["int:Marks"]
outputs = ["float:MarksPercentage"]
constraints = ["int:Marks >= 0"]
"#;

    #[test]
    fn parse_toml_repository() {
        let repo = parse_repository(STUDENT_TOML, Format::Toml).unwrap();
        assert_eq!(repo.len(), 3);
        let w10 = repo.get("W10").unwrap();
        assert_eq!(w10.constraints[0].operator, Operator::GreaterThanOrEqualTo);
        assert_eq!(w10.constraints[0].subject.as_deref(), Some("W10"));
        assert!(repo.get("W9").unwrap().affects(&Parameter::new("int:Marks")));
    }

    #[test]
    fn parse_json_repository() {
        let json = r#"{"service": [
            {"name": "A", "inputs": ["x"], "outputs": ["y"]},
            {"name": "B", "inputs": ["y"], "outputs": ["z"], "constraints": ["y < 3"]}
        ]}"#;
        let repo = parse_repository(json, Format::Json).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("B").unwrap().constraints[0].to_string(), "y < 3");
    }

    #[test]
    fn bad_service_constraint_names_the_service() {
        let toml_str = r#"
[[service]]
name = "Broken"
inputs = ["a"]
outputs = ["b"]
constraints = ["a <"]
"#;
        let err = parse_repository(toml_str, Format::Toml).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidConstraint { .. }));
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(parse_repository("this is not valid toml [[[", Format::Toml).is_err());
        assert!(parse_repository("{", Format::Json).is_err());
    }

    #[test]
    fn template_round_trips() {
        let toml_str = repository_template().unwrap();
        let repo = parse_repository(&toml_str, Format::Toml).unwrap();
        assert_eq!(repo.len(), 4);
        assert!(validate_repository(&repo).is_ok());
        assert_eq!(repository_to_toml(&repo).unwrap(), toml_str);

        let request = parse_request(&request_template().unwrap(), Format::Toml).unwrap();
        assert_eq!(request.qos(), &[QosFeature::ResponseTime]);
        assert_eq!(request.constraints().len(), 1);
    }

    #[test]
    fn composite_services_are_not_written_as_plain_ones() {
        let request = CompositionRequest::new(
            ["string:StudentID"],
            ["float:MarksPercentage"],
            Vec::<&str>::new(),
            Vec::<&str>::new(),
        )
        .unwrap();
        let plan = ConstraintAwarePlan::from_layers(vec![
            vec![Service::new("W8")
                .with_inputs(["string:StudentID"])
                .with_outputs(["string:CourseID"])
                .into_shared()],
            vec![Service::new("W9")
                .with_inputs(["string:CourseID"])
                .with_outputs(["float:MarksPercentage"])
                .into_shared()],
        ]);
        let repo = ServiceRepository::from_services(vec![
            Service::composite("Percentage", &request, plan),
            Service::new("W11")
                .with_inputs(["float:MarksPercentage"])
                .with_outputs(["string:Grade"]),
        ])
        .unwrap();

        let err = repository_to_toml(&repo).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { .. }));
        assert!(err.to_string().contains("Percentage"));
    }

    #[test]
    fn request_validation_errors_surface() {
        let err = parse_request("outputs = [\"b\"]", Format::Toml).unwrap_err();
        assert!(matches!(err, RepositoryError::Request(_)));

        let err = parse_request(
            "inputs = [\"a\"]\noutputs = [\"b\"]\nconstraints = [\"c < 1\"]",
            Format::Toml,
        )
        .unwrap_err();
        assert!(err.to_string().contains("c"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.services.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.services.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("request")), Format::Toml);
    }

    #[test]
    fn load_rejects_invalid_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.services.toml");
        std::fs::write(&path, "[[service]]\nname = \"NoOut\"\ninputs = [\"a\"]\n").unwrap();
        let err = load_repository(&path).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { .. }));
        assert!(err.to_string().contains("no outputs"));
    }

    #[test]
    fn load_not_found() {
        let result = load_repository(Path::new("/nonexistent/path.services.toml"));
        assert!(matches!(result.unwrap_err(), RepositoryError::NotFound { .. }));
    }

    #[test]
    fn load_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"inputs": ["string:StudentID"], "outputs": ["float:MarksPercentage"], "qos": ["cost"]}"#,
        )
        .unwrap();
        let request = load_request(&path).unwrap();
        assert_eq!(request.qos(), &[QosFeature::Cost]);
    }

    #[test]
    fn discover_and_merge_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let services_dir = dir.path().join("services");
        std::fs::create_dir_all(&services_dir).unwrap();
        std::fs::write(services_dir.join("student.services.toml"), STUDENT_TOML).unwrap();
        std::fs::write(
            services_dir.join("extra.services.json"),
            r#"{"service": [{"name": "W11", "inputs": ["float:MarksPercentage"], "outputs": ["string:Grade"]}]}"#,
        )
        .unwrap();
        std::fs::write(services_dir.join("notes.txt"), "ignore me").unwrap();

        let found = discover_repositories(dir.path()).unwrap();
        let names: Vec<&str> = found.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["extra", "student"]);

        let paths: Vec<&PathBuf> = found.iter().map(|(_, p)| p).collect();
        let repo = load_repositories(&paths).unwrap();
        assert_eq!(repo.len(), 4);
        assert_eq!(repo.services()[0].name, "W11");

        let err = load_repositories(&[&paths[1], &paths[1]]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_repositories(dir.path()).unwrap().is_empty());
    }
}
