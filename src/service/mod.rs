//! PointService: store-then-index orchestration, plus payload validation.

mod point;
mod validation;
pub use point::PointService;
pub use validation::RequestValidator;
