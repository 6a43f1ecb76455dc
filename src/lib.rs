// Main library entry point for Traceforge.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
