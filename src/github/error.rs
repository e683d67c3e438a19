use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum Error {
    /// Token missing or rejected, HTTP 401/403.
    #[error("authentication rejected (HTTP {status})")]
    Auth { status: StatusCode },

    /// HTTP 404. Distinguishes "wiki repository absent" from a failure.
    #[error("not found: {url}")]
    NotFound { url: Url },

    #[error("transport failure")]
    Transport(#[source] reqwest::Error),

    /// Response body did not match the expected schema.
    #[error("unexpected response body")]
    Decode(#[source] reqwest::Error),

    #[error("unexpected status (HTTP {status})")]
    Status { status: StatusCode },

    #[error("graphql response: {0}")]
    Graphql(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] http::header::InvalidHeaderValue),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err)
        } else {
            Error::Transport(err)
        }
    }
}
