//! Planner errors.

use thiserror::Error;
use wsc_core::PlanError;

/// Errors that stop the planning pipeline.
///
/// An unsolvable request is not an error; see [`crate::Unsolvable`].
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] PlanError),

    #[error(
        "layer {layer} has {width} services, above the power-set limit of {limit}; \
         raise max_layer_width (at most 63) to enumerate it"
    )]
    LayerTooWide {
        layer: usize,
        width: usize,
        limit: usize,
    },

    #[error("invalid planner configuration: {message}")]
    InvalidConfig { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_wraps_plan_error() {
        let err: PlannerError = PlanError::EmptyLayer(2).into();
        assert!(err.to_string().contains("layer 2 is empty"));
    }

    #[test]
    fn layer_too_wide_display() {
        let err = PlannerError::LayerTooWide {
            layer: 1,
            width: 40,
            limit: 16,
        };
        let message = err.to_string();
        assert!(message.contains("40"));
        assert!(message.contains("raise max_layer_width"));
    }
}
