//! Shared repositories for planner tests.

use std::sync::Arc;

use wsc_core::{CompositionRequest, Service};

pub(crate) fn svc(name: &str, inputs: &[&str], outputs: &[&str]) -> Arc<Service> {
    Service::new(name)
        .with_inputs(inputs.iter().copied())
        .with_outputs(outputs.iter().copied())
        .into_shared()
}

pub(crate) fn request(inputs: &[&str], outputs: &[&str]) -> CompositionRequest {
    CompositionRequest::new(inputs, outputs, Vec::<&str>::new(), Vec::<&str>::new()).unwrap()
}

/// A student-records repository with one useful chain W8 -> W9 -> W10, a
/// service past the goal (W11), one that adds nothing (W2) and one that is
/// never runnable (W1).
pub(crate) fn student() -> Vec<Arc<Service>> {
    vec![
        svc("W1", &["string:EmployeeID"], &["float:Salary"]),
        svc("W2", &["string:StudentID"], &["string:StudentID"]),
        svc("W8", &["string:StudentID"], &["string:CourseID"]),
        svc("W9", &["string:CourseID"], &["int:Marks"]),
        svc("W10", &["int:Marks"], &["float:MarksPercentage"]),
        svc("W11", &["float:MarksPercentage"], &["string:Grade"]),
    ]
}

pub(crate) fn student_request() -> CompositionRequest {
    request(&["string:StudentID"], &["float:MarksPercentage"])
}

/// Ten services over six layers where the requested output is produced at
/// layers 1, 2 and 3, each time by a single-predecessor chain back to A.
///
/// Layers: `[A, B, C]`, `[D]`, `[F]`, `[G]`, `[J]`, `[M]`. K never runs and L
/// only re-produces an input.
pub(crate) fn starting_layers() -> Vec<Arc<Service>> {
    vec![
        svc("A", &["input12"], &["a"]),
        svc("B", &["input31"], &["b"]),
        svc("C", &["input32"], &["c"]),
        svc("D", &["a"], &["output11", "d"]),
        svc("F", &["d"], &["output11", "f"]),
        svc("G", &["f"], &["output11", "g"]),
        svc("J", &["g"], &["j"]),
        svc("K", &["input99"], &["k"]),
        svc("L", &["input12"], &["input12"]),
        svc("M", &["j"], &["m"]),
    ]
}

pub(crate) fn starting_layers_request() -> CompositionRequest {
    request(&["input12", "input31", "input32"], &["output11"])
}
