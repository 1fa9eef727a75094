//! Input-safety gate applied to every chat turn
//!
//! The gate is a pure, synchronous text classifier; an injection match is a
//! successful classification outcome (the gateway answers with a polite
//! redirect), never an error.

pub mod classifier;

pub use classifier::{Classification, Classifier, ClassifierRule};
