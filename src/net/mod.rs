//! HTTP client construction and the bounded wait for connectivity.

use crate::config::NetworkConfig;
use crate::error::NetworkError;
use reqwest::Client;
use std::time::Duration;

/// Install the ring crypto provider for rustls.
///
/// Idempotent: later calls see the provider already installed and do nothing.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub fn build_client(config: &NetworkConfig) -> Result<Client, NetworkError> {
    install_crypto_provider();
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent())
        .build()
        .map_err(|error| NetworkError::Client(error.to_string()))
}

/// Parameters of one [`wait_for_network`] call.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    /// Overall deadline for the whole wait.
    pub deadline: Duration,
    pub probe_timeout: Duration,
    pub retry_interval: Duration,
}

impl From<&NetworkConfig> for WaitPolicy {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            deadline: config.wait_timeout(),
            probe_timeout: config.probe_timeout(),
            retry_interval: config.retry_interval(),
        }
    }
}

/// Probe `url` with HEAD requests until one succeeds or the deadline passes.
///
/// Timeouts, connection errors and HTTP error statuses are all retried;
/// during early login DNS and the distribution point are often not ready yet.
pub async fn wait_for_network(
    client: &Client,
    url: &str,
    policy: WaitPolicy,
) -> Result<(), NetworkError> {
    tracing::debug!(url, deadline_secs = policy.deadline.as_secs(), "Waiting for network");

    let probe_loop = async {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let result = client
                .head(url)
                .timeout(policy.probe_timeout)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);
            match result {
                Ok(_) => {
                    tracing::debug!(url, attempt, "Network is available");
                    return;
                }
                Err(error) if error.is_timeout() => {
                    tracing::warn!(url, attempt, "Network probe timed out: {error}");
                }
                Err(error) if error.is_status() => {
                    tracing::warn!(url, attempt, "Network probe returned an error status: {error}");
                }
                Err(error) => {
                    tracing::warn!(url, attempt, "Network not available: {error}");
                }
            }
            tokio::time::sleep(policy.retry_interval).await;
        }
    };

    tokio::time::timeout(policy.deadline, probe_loop)
        .await
        .map_err(|_| {
            tracing::error!(url, "Timeout exceeded waiting for network");
            NetworkError::Unavailable {
                url: url.to_string(),
                waited_secs: policy.deadline.as_secs(),
            }
        })
}
