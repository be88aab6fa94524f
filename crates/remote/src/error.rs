/// A failed remote fetch.
///
/// Transport failures, non-success statuses and undecodable bodies stay distinguishable for
/// logging, but all of them abort the fetch and render as "fetch failed".
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed: could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("fetch failed: request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch failed: {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("fetch failed: unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
