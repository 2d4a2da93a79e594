use thiserror::Error;

/// The two failure classes that reach the caller. Everything else in the
/// pipeline (undetectable language, unparseable dates, missing optional feed
/// fields) recovers locally and never surfaces.
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied app link carries no `id<digits>` anywhere. Raised before
    /// any network call is made.
    #[error("no id<digits> found in app link: {0:?}")]
    InvalidInput(String),

    /// A transport-level failure (connect error, timeout, non-2xx status)
    /// that survived the whole retry schedule.
    #[error("fetching {url} failed after {attempts} attempts: {source}")]
    Fetch {
        url: String,
        attempts: u32,
        #[source]
        source: ureq::Error,
    },

    /// The server answered 2xx but the body is not JSON. Not retried: the
    /// feed is answering, it is just not speaking the protocol we expect.
    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
