use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::{Error, Result};

const MAX_BACKOFF_SECS: u64 = 60;

/// Client with a session cookie store, shared by every portal request.
pub fn create_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()?;

    Ok(client)
}

/// Send an idempotent request, retrying transport errors and 5xx answers with backoff.
pub async fn fetch_with_retry<F>(build: F, url: &str, max_retries: u32) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let max_retries = max_retries.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let last_error = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                warn!("HTTP error {}: {}", status, url);
                let err = Error::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                };
                if !status.is_server_error() {
                    return Err(err);
                }
                err
            }
            Err(e) => {
                error!("Request failed for {}: {}", url, e);
                Error::Http(e)
            }
        };

        if attempts >= max_retries {
            return Err(last_error);
        }

        let delay = backoff_delay(attempts);
        warn!("Retrying in {:?}... (attempt {}/{})", delay, attempts + 1, max_retries);
        sleep(delay).await;
    }
}

/// Exponential backoff after the given attempt, capped at a minute.
fn backoff_delay(attempts: u32) -> Duration {
    let secs = 2u64
        .checked_pow(attempts)
        .map_or(MAX_BACKOFF_SECS, |secs| secs.min(MAX_BACKOFF_SECS));
    Duration::from_secs(secs)
}
