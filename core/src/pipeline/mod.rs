// core/src/pipeline/mod.rs

//! A small step runner for the storefront's multi-step workflows
//! (sign-in reconciliation, order placement).
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step has one or more
//! async handlers that receive a clone of the shared [`ContextData`] and return
//! a [`PipelineControl`] or the pipeline's error type.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, StepDef};

/// Failures raised by the runner itself rather than by a handler.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
