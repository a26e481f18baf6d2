//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::RunArgs;
pub use types::{HttpMethod, OutputFormat, PositiveUsize};

pub(crate) use defaults::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_USER_AGENT};
pub(crate) use parsers::{parse_duration_arg, parse_header};
