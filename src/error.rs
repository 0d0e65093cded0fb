use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraktError>;

/// Errors surfaced by the Trakt client. Classification happens once, at the
/// request choke point; callers decide whether and how to retry.
#[derive(Debug, Error)]
pub enum TraktError {
    /// A mutation was requested without any movie identifier. No request is
    /// sent in this case.
    #[error("need one of tmdb_id, imdb_id")]
    InvalidArgument,

    /// The service rejected the credentials or token (HTTP 401).
    #[error("authentication rejected by the service")]
    Authentication,

    /// The service could not be reached at the transport level.
    #[error("could not reach the service: {0}")]
    Connection(#[source] reqwest::Error),

    /// Any other non-success HTTP status, passed through unmapped.
    #[error("unexpected HTTP status {status}")]
    Http { status: reqwest::StatusCode },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
