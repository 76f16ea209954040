use futures_util::StreamExt;
use reqwest::{Client, Request, header::CONTENT_TYPE};
use tracing::error;

use crate::args::HttpMethod;
use crate::config::RunConfig;
use crate::error::{AppError, AppResult, HttpError};
use crate::metrics::{FailureKind, Outcome};

/// Build the request template all of a worker's attempts are cloned from.
///
/// Body-carrying methods default to `Content-Type: application/json` unless a
/// header overrides it.
///
/// # Errors
///
/// Returns an error when the request cannot be constructed (for example an
/// invalid header name slipped past validation).
pub fn build_request_template(client: &Client, config: &RunConfig) -> AppResult<Request> {
    let url = config.url.clone();
    let mut builder = match config.method {
        HttpMethod::Get => client.get(url),
        HttpMethod::Post => client.post(url),
        HttpMethod::Patch => client.patch(url),
        HttpMethod::Put => client.put(url),
        HttpMethod::Delete => client.delete(url),
    };

    if config.method.has_body() && !has_content_type(&config.headers) {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    for (key, value) in &config.headers {
        builder = builder.header(key, value);
    }

    builder
        .body(config.body.clone())
        .build()
        .map_err(|err| AppError::http(HttpError::BuildRequestFailed { source: err }))
}

fn has_content_type(headers: &[(String, String)]) -> bool {
    headers
        .iter()
        .any(|(key, _)| key.eq_ignore_ascii_case("content-type"))
}

/// Perform one request attempt: clone the template, send it, drain the
/// response body, and classify the result. Failures are logged and folded
/// into the outcome; they never propagate.
pub async fn send_request(client: &Client, template: &Request) -> Outcome {
    let request = match template.try_clone() {
        Some(request) => request,
        None => {
            error!("Failed to clone request template.");
            return Outcome::Failed(FailureKind::Transport);
        }
    };

    match client.execute(request).await {
        Ok(response) => {
            let status = response.status().as_u16();
            match drain_response_body(response).await {
                Ok(_bytes) => Outcome::Status(status),
                Err(err) => {
                    error!("Failed to read response body: {}", err);
                    Outcome::Failed(FailureKind::classify(&err))
                }
            }
        }
        Err(err) => {
            error!("Request failed: {}", err);
            Outcome::Failed(FailureKind::classify(&err))
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
