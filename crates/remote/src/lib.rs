//! # apiai2text remote
//!
//! Fetches an agent's intents live from the API.AI v1 REST API.
//!
//! The flow is one listing request followed by one request per intent, each authorised with
//! the caller's bearer token and spaced by a fixed minimum interval. Requests are issued
//! strictly one at a time. The documents come back as [`RawDocument`]s, labelled with the
//! intent name, ready for the core conversion pipeline.

pub mod config;
pub mod error;
pub mod throttle;

pub use config::RemoteConfig;
pub use error::{FetchError, FetchResult};
pub use throttle::Throttle;

// Re-exported so callers can build a custom client for `RemoteFetcher::with_client`.
pub use reqwest;

use apiai2text_core::RawDocument;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// One row of the intent listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IntentListing {
    pub id: String,
    pub name: String,
}

/// Client for the intents endpoints of the remote API.
#[derive(Clone, Debug)]
pub struct RemoteFetcher {
    client: Client,
    config: RemoteConfig,
}

impl RemoteFetcher {
    /// Builds a fetcher whose requests time out after `config.request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, config })
    }

    /// Uses a preconfigured client instead of building one from `config`.
    pub fn with_client(client: Client, config: RemoteConfig) -> Self {
        Self { client, config }
    }

    /// Fetches every intent of the agent the token belongs to.
    ///
    /// # Arguments
    ///
    /// * `token` - Developer access token, forwarded as a bearer credential.
    ///
    /// # Returns
    ///
    /// One [`RawDocument`] per listed intent, in listing order, named after the intent.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`] encountered; nothing fetched so far is returned.
    pub async fn fetch_all(&self, token: &str) -> FetchResult<Vec<RawDocument>> {
        let mut throttle = Throttle::new(self.config.min_interval);

        let listings = self.list_intents(token, &mut throttle).await?;
        tracing::info!(count = listings.len(), "fetching intents");

        let mut documents = Vec::with_capacity(listings.len());
        for listing in listings {
            let content = self.fetch_intent(token, &listing.id, &mut throttle).await?;
            tracing::debug!(intent = %listing.name, "fetched intent");
            documents.push(RawDocument::new(listing.name, content));
        }

        Ok(documents)
    }

    /// Lists the `(id, name)` pairs of every intent.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails, the status is not a success, or the body
    /// is not an intent listing.
    pub async fn list_intents(
        &self,
        token: &str,
        throttle: &mut Throttle,
    ) -> FetchResult<Vec<IntentListing>> {
        self.get_json(&self.config.intents_url(), token, throttle)
            .await
    }

    /// Fetches the full document of one intent.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the request fails, the status is not a success, or the body
    /// is not JSON.
    pub async fn fetch_intent(
        &self,
        token: &str,
        id: &str,
        throttle: &mut Throttle,
    ) -> FetchResult<Value> {
        self.get_json(&self.config.intent_url(id), token, throttle)
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        throttle: &mut Throttle,
    ) -> FetchResult<T> {
        throttle.wait().await;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("v", self.config.protocol_version.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
