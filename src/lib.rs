//! Core library for the `chopper` HTTP benchmarking CLI.
//!
//! A run spawns a fixed number of workers that send the same request back to
//! back for a configured duration, walking redirects and keeping cookies per
//! worker when asked to. Every completed request becomes a
//! [`metrics::RequestOutcome`]; the outcomes are reduced to an
//! [`metrics::Aggregate`] once all workers have stopped.
//!
//! The `chopper` binary adds config files, a progress line and the summary
//! printout on top of these modules.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod runner;
pub mod shutdown;
