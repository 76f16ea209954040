use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize};
use super::types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator - fixed worker pools, shared rate budgets, and per-second status-code breakdowns."
)]
pub struct LoadArgs {
    /// Target URL for the load test (scheme selects the transport: http, https, h2, h3)
    #[arg(long, short)]
    pub url: String,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Requests per second shared across all workers
    #[arg(long = "rate", short = 'r', default_value = "10", value_parser = parse_positive_u64)]
    pub rate: PositiveU64,

    /// Number of concurrent workers
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = "5",
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Duration of the test (supports ms/s/m/h)
    #[arg(
        long = "duration",
        short = 't',
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body data (for POST/PUT/PATCH)
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Accept invalid TLS certificates and hostnames
    #[arg(long = "insecure", short = 'k')]
    pub insecure: bool,

    /// Let requests in flight at the deadline finish instead of abandoning them
    #[arg(long = "wait-ongoing")]
    pub wait_ongoing: bool,

    /// Final summary output format
    #[arg(long = "output-format", default_value = "text", value_enum)]
    pub output_format: OutputFormat,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by VOLLEY_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
