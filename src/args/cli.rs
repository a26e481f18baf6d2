use clap::Parser;
use std::net::IpAddr;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_header, parse_positive_usize};
use super::types::{HttpMethod, OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "chopper",
    version,
    about = "Modern utility for HTTP benchmarking."
)]
pub struct RunArgs {
    /// URL to benchmark
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Request method to use when communicating with the HTTP server
    #[arg(long = "request", short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Number of requests to perform at once
    #[arg(long, short = 'c', default_value = "1", value_parser = parse_positive_usize)]
    pub concurrency: PositiveUsize,

    /// Time through which to run the benchmark (supports ms/s/m/h, e.g. 1m30s)
    #[arg(long, short = 'd', default_value = "1h", value_parser = parse_duration_arg)]
    pub duration: Duration,

    /// Append an extra header to the request in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// User-Agent string to send to the HTTP server
    #[arg(long = "useragent", short = 'A')]
    pub user_agent: Option<String>,

    /// IP address to send to the HTTP server as the source of the request (X-Forwarded-For)
    #[arg(long = "ip-address", short = 'i')]
    pub ip_address: Option<IpAddr>,

    /// Reuse existing connections for subsequent requests
    #[arg(long = "keep-alive", short = 'k')]
    pub keep_alive: bool,

    /// Follow the Location header in case of a 3xx response code
    #[arg(long = "location", short = 'L')]
    pub follow_redirects: bool,

    /// Number of redirects to follow before giving up on a request
    #[arg(long = "max-redirects", default_value_t = 0)]
    pub max_redirects: u32,

    /// Keep a cookie jar per worker and send cookies on subsequent requests
    #[arg(long = "cookie-jar", short = 'C')]
    pub cookie_jar: bool,

    /// Per-request timeout enforced by the transport (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Connection timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Summary output format
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Disable the progress line
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by CHOPPER_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./chopper.toml or ./chopper.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
