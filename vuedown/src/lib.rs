//! Expose vuedown's command line internals for use in integration tests.
pub mod cli;
pub mod files;
pub mod run;
