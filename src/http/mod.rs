//! Transport selection, request execution, the shared rate limiter, and the
//! worker pool.
mod rate;
mod request;
mod transport;
mod worker;

#[cfg(test)]
mod tests;

pub use rate::RateLimiter;
pub use request::{build_request_template, send_request};
pub use transport::{TransportKind, build_client};
pub use worker::spawn_workers;
