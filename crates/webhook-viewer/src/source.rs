use std::future::Future;
use std::time::Duration;
use webhook_core::{decode_feed, PollError, WebhookFeed};

pub const DEFAULT_FEED_URL: &str = "http://localhost:5000/webhook/data";

/// Where the poller gets its data from.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<WebhookFeed, PollError>> + Send;

    fn label(&self) -> String;
}

/// `GET`s the webhook log from the backend.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webhook-viewer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| PollError::Fetch(err.to_string()))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<WebhookFeed, PollError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| PollError::Fetch(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| PollError::Fetch(err.to_string()))?;
        decode_feed(&body)
    }

    fn label(&self) -> String {
        self.url.clone()
    }
}
