//! Blocking HTTP transport.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use esrole_core::{ProviderError, ProviderResult};

use crate::config::ClientConfig;
use crate::transport::{Method, Request, Response, Transport};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    /// Basic-auth user and optional password.
    credentials: Option<(String, Option<String>)>,
    max_retries: u32,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ProviderResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.url)
            .map_err(|e| ProviderError::config(format!("url '{}': {e}", config.url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::config(format!("url '{}' cannot be a base", config.url)));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials: config
                .credentials()
                .map(|(user, password)| (user.to_string(), password.map(str::to_string))),
            max_retries: config.max_retries,
        })
    }

    fn url(&self, request: &Request) -> ProviderResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::config(format!("url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }

    fn send_once(&self, url: Url, request: &Request) -> Result<Response, reqwest::Error> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(Response::new(status, body))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> ProviderResult<Response> {
        let url = self.url(request)?;
        let mut attempt: u32 = 0;

        loop {
            match self.send_once(url.clone(), request) {
                Ok(response) => {
                    tracing::debug!(
                        method = %request.method,
                        path = %request.path(),
                        status = response.status,
                        "elasticsearch request completed"
                    );
                    return Ok(response);
                }
                // Only failures where the cluster never answered are retried.
                Err(e) if attempt < self.max_retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    tracing::warn!(
                        method = %request.method,
                        path = %request.path(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "elasticsearch request failed; retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => {
                    return Err(ProviderError::transport(format!(
                        "{} {}: {e}",
                        request.method,
                        request.path()
                    )));
                }
            }
        }
    }
}

/// Exponential backoff for the given 1-based attempt, capped at [`RETRY_MAX_DELAY`].
fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_BASE_DELAY.saturating_mul(factor).min(RETRY_MAX_DELAY)
}
