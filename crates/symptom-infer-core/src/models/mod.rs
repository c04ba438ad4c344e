//! Domain models for symptom inference.

mod condition;
mod prediction;
mod response;

pub use condition::*;
pub use prediction::*;
pub use response::*;
