//! Validated, immutable run configuration.
//!
//! All fail-fast validation lives here: a [`RunConfig`] only exists for runs
//! that are safe to start. It is created once, wrapped in an `Arc`, and shared
//! read-only with every worker.
use std::time::Duration;

use url::Url;

use crate::args::{HttpMethod, LoadArgs, OutputFormat, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::TransportKind;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target URL, already rewritten to `https` for `h2`/`h3` schemes.
    pub url: Url,
    pub method: HttpMethod,
    pub rate: PositiveU64,
    pub concurrency: PositiveUsize,
    pub duration: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub insecure: bool,
    pub wait_ongoing: bool,
    pub output_format: OutputFormat,
    pub transport: TransportKind,
}

impl RunConfig {
    /// Validate CLI arguments into a run configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unparseable URL, a URL without a
    /// host, an unsupported scheme, or a zero duration, all before any
    /// worker starts.
    pub fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let url = Url::parse(&args.url).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                url: args.url.clone(),
                source: err,
            })
        })?;
        if url.host_str().is_none() {
            return Err(AppError::validation(ValidationError::UrlMissingHost));
        }

        let transport = TransportKind::for_url(&url).map_err(AppError::validation)?;
        let url = if transport.rewrites_to_https() {
            rewrite_to_https(&url).map_err(AppError::validation)?
        } else {
            url
        };

        if args.duration.as_millis() == 0 {
            return Err(AppError::validation(ValidationError::DurationZero));
        }

        validate_headers(&args.headers)?;

        Ok(Self {
            url,
            method: args.method,
            rate: args.rate,
            concurrency: args.concurrency,
            duration: args.duration,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            headers: args.headers.clone(),
            body: args.data.clone(),
            insecure: args.insecure,
            wait_ongoing: args.wait_ongoing,
            output_format: args.output_format,
            transport,
        })
    }
}

fn validate_headers(headers: &[(String, String)]) -> AppResult<()> {
    for (key, value) in headers {
        http::header::HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderName {
                header: key.clone(),
                source: err,
            })
        })?;
        http::header::HeaderValue::from_str(value).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderValue {
                header: key.clone(),
                source: err,
            })
        })?;
    }
    Ok(())
}

/// The url crate refuses to switch a non-special scheme to a special one in
/// place, so the rewrite goes through a reparse.
fn rewrite_to_https(url: &Url) -> Result<Url, ValidationError> {
    let raw = url.as_str();
    let rest = raw
        .split_once(':')
        .map_or(raw, |(_scheme, rest)| rest);
    let rewritten = format!("https:{}", rest);
    Url::parse(&rewritten).map_err(|err| ValidationError::InvalidUrl {
        url: rewritten.clone(),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args_for(url: &str) -> Result<LoadArgs, String> {
        LoadArgs::try_parse_from(["volley", "-u", url])
            .map_err(|err| format!("parse failed: {}", err))
    }

    #[test]
    fn plain_http_resolves_plain_transport() -> Result<(), String> {
        let args = args_for("http://example.com/path")?;
        let config = RunConfig::from_args(&args).map_err(|err| format!("config failed: {}", err))?;
        if config.transport != TransportKind::Plain {
            return Err(format!("Unexpected transport: {:?}", config.transport));
        }
        if config.url.scheme() != "http" {
            return Err(format!("Scheme should be untouched, got {}", config.url.scheme()));
        }
        Ok(())
    }

    #[test]
    fn h2_scheme_rewrites_to_https() -> Result<(), String> {
        let args = args_for("h2://example.com:8443/check")?;
        let config = RunConfig::from_args(&args).map_err(|err| format!("config failed: {}", err))?;
        if config.transport != TransportKind::Http2PriorKnowledge {
            return Err(format!("Unexpected transport: {:?}", config.transport));
        }
        if config.url.scheme() != "https" {
            return Err(format!("Expected https scheme, got {}", config.url.scheme()));
        }
        if config.url.host_str() != Some("example.com") {
            return Err(format!("Host lost in rewrite: {:?}", config.url.host_str()));
        }
        if config.url.port() != Some(8443) {
            return Err(format!("Port lost in rewrite: {:?}", config.url.port()));
        }
        Ok(())
    }

    #[test]
    fn unparseable_url_fails_fast() -> Result<(), String> {
        let args = args_for("http://")?;
        if RunConfig::from_args(&args).is_ok() {
            return Err("Expected invalid URL to be rejected".to_owned());
        }
        Ok(())
    }

    #[test]
    fn invalid_header_name_fails_fast() -> Result<(), String> {
        let args = LoadArgs::try_parse_from([
            "volley",
            "-u",
            "http://example.com",
            "-H",
            "Bad Header Name: value",
        ])
        .map_err(|err| format!("parse failed: {}", err))?;
        if RunConfig::from_args(&args).is_ok() {
            return Err("Expected header name with spaces to be rejected".to_owned());
        }
        Ok(())
    }

    #[test]
    fn unsupported_scheme_fails_fast() -> Result<(), String> {
        let args = args_for("ftp://example.com/file")?;
        if RunConfig::from_args(&args).is_ok() {
            return Err("Expected ftp scheme to be rejected".to_owned());
        }
        Ok(())
    }

    #[cfg(not(feature = "http3"))]
    #[test]
    fn h3_without_feature_fails_fast() -> Result<(), String> {
        let args = args_for("h3://example.com/")?;
        if RunConfig::from_args(&args).is_ok() {
            return Err("Expected h3 to require the http3 feature".to_owned());
        }
        Ok(())
    }
}
