use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// User agent sent to public data services that require one.
pub const USER_AGENT: &str = concat!("solarcast/", env!("CARGO_PKG_VERSION"));

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware
    pub fn create_client(timeout: Duration) -> ClientWithMiddleware {
        // Exponential backoff, 3 retries on transient failures
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Appends query parameters to `base_url`.
///
/// `ClientWithMiddleware` has no `.query()`, so callers pass the full URL.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> anyhow::Result<Url>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url)?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k.as_ref(), v.as_ref());
        }
    }
    Ok(url)
}
