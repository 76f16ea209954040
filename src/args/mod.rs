//! CLI argument types and parsers.
mod cli;
mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::LoadArgs;
pub use parsers::{parse_duration_arg, parse_header};
pub use types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize};

pub const DEFAULT_USER_AGENT: &str =
    concat!("volley-loadtest/", env!("CARGO_PKG_VERSION"));
