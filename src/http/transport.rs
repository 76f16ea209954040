use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::RunConfig;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Protocol stack selected by the target URL scheme.
///
/// The engine is agnostic to which stack carries a request; everything after
/// scheme resolution goes through the same [`Client`] interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Plain HTTP/1.1 (`http` scheme).
    Plain,
    /// TLS with default ALPN, h1 or h2 negotiated (`https` scheme).
    Tls,
    /// HTTP/2 with prior knowledge over TLS (`h2` scheme).
    Http2PriorKnowledge,
    /// HTTP/3 over QUIC (`h3` scheme, requires the `http3` feature).
    Http3,
}

impl TransportKind {
    /// Resolve the transport for a URL scheme.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedScheme` for schemes outside http/https/h2/h3, and
    /// `Http3NotEnabled` when `h3` is requested without the `http3` feature.
    pub fn for_url(url: &Url) -> Result<Self, ValidationError> {
        match url.scheme() {
            "http" => Ok(TransportKind::Plain),
            "https" => Ok(TransportKind::Tls),
            "h2" => Ok(TransportKind::Http2PriorKnowledge),
            "h3" => {
                #[cfg(feature = "http3")]
                {
                    Ok(TransportKind::Http3)
                }
                #[cfg(not(feature = "http3"))]
                {
                    Err(ValidationError::Http3NotEnabled)
                }
            }
            other => Err(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }

    /// Whether the scheme is a stand-in that must be rewritten to `https`
    /// before the request is built.
    #[must_use]
    pub const fn rewrites_to_https(self) -> bool {
        match self {
            TransportKind::Http2PriorKnowledge | TransportKind::Http3 => true,
            TransportKind::Plain | TransportKind::Tls => false,
        }
    }
}

/// Build the HTTP client bound to the configured transport.
///
/// # Errors
///
/// Returns an error when the underlying client cannot be constructed.
pub fn build_client(config: &RunConfig) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(crate::args::DEFAULT_USER_AGENT)
        .pool_idle_timeout(Some(Duration::from_secs(30)));

    builder = match config.transport {
        TransportKind::Plain | TransportKind::Tls => builder,
        // Prior-knowledge targets are usually ad-hoc endpoints without a
        // publicly trusted certificate chain.
        TransportKind::Http2PriorKnowledge => builder
            .http2_prior_knowledge()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true),
        TransportKind::Http3 => apply_http3(builder)?,
    };

    if config.insecure {
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

#[cfg(feature = "http3")]
fn apply_http3(builder: reqwest::ClientBuilder) -> AppResult<reqwest::ClientBuilder> {
    Ok(builder.http3_prior_knowledge())
}

#[cfg(not(feature = "http3"))]
fn apply_http3(_builder: reqwest::ClientBuilder) -> AppResult<reqwest::ClientBuilder> {
    Err(AppError::validation(ValidationError::Http3NotEnabled))
}
