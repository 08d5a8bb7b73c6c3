use thiserror::Error;

pub type MyGeotabClientResult<T> = Result<T, MyGeotabError>;

#[derive(Error, Debug)]
pub enum MyGeotabError {
    #[error("Failed to build MyGeotab HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("MyGeotab {method} request failed: {source}")]
    Request {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("MyGeotab {method} returned HTTP {status}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },

    #[error("MyGeotab {method} returned an unreadable response: {source}")]
    Payload {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("MyGeotab {method} error: {message}")]
    Rpc { method: String, message: String },

    #[error("MyGeotab authentication returned no credentials")]
    MissingCredentials,
}
