//! Library modules for the `integrity` binary
pub mod batch;
pub mod inputs;
pub mod render;
