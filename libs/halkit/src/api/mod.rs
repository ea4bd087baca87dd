//! HTTP boundary: page-state extraction, problem responses and HAL bodies.
//!
//! Malformed page state is rejected here, before any builder runs.

pub mod error;
pub mod page_query;
pub mod problem;
pub mod response;

pub use error::hal_error_to_problem;
pub use problem::{
    bad_request, internal_error, Problem, ProblemResponse, APPLICATION_PROBLEM_JSON,
};
pub use response::{HalJson, APPLICATION_HAL_JSON};
