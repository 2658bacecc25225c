//! Input format support.

pub mod csv;
