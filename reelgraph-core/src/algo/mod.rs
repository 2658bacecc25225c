//! Graph algorithms.

pub mod walk;
