//! Statistical text classifier for condition labels.
//!
//! A count-vectorized multinomial logistic regression: text is cleaned,
//! tokenized, mapped onto a fixed vocabulary and scored per label. The
//! softmax probability of the winning label is the confidence the engine's
//! trained-model adapter reports.

pub mod linear;
pub mod preprocess;

pub use linear::*;
pub use preprocess::*;
