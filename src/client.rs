use crate::{page::PageSource, util::wait_random_range_ms};
use reqwest::IntoUrl;
use std::time::Duration;
use tracing::trace;
use url::Url;

// Some sites refuse requests without a browser-like user agent
static APP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct Opts {
    /// Upper bound for the random pause before each request
    pub request_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Opts {
    fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::ClientBuilder::new()
            .user_agent(APP_USER_AGENT)
            .timeout(self.request_timeout)
            .build()
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    client: reqwest::Client,
    request_delay: Duration,
}

impl Client {
    pub fn build(opts: Opts) -> reqwest::Result<Self> {
        Ok(Self {
            client: opts.build_client()?,
            request_delay: opts.request_delay,
        })
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    pub async fn get_as_string<U: IntoUrl>(&self, url: U) -> anyhow::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .map_err(anyhow::Error::from)
    }
}

impl PageSource for Client {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
        // Throttle requests to not get blocked
        let max = self.request_delay.as_millis() as u64;
        wait_random_range_ms(max / 4, max).await;
        trace!(url = %url, "Fetching page...");
        self.get_as_string(url.clone()).await
    }
}
