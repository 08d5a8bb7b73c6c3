use thiserror::Error;

pub type DataConnectorClientResult<T> = Result<T, DataConnectorError>;

#[derive(Error, Debug)]
pub enum DataConnectorError {
    #[error("Data Connector base URL is empty")]
    EmptyBaseUrl,

    #[error("Invalid Data Connector base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build Data Connector HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Data Connector request for {table} on {host} failed: {source}")]
    Request {
        table: String,
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "Data Connector returned HTTP {status} for {table} on {host}: {body}"
    )]
    Status {
        status: u16,
        body: String,
        table: String,
        host: String,
    },

    #[error("Data Connector returned an unreadable page for {table} on {host}: {source}")]
    Payload {
        table: String,
        host: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DataConnectorError {
    /// Whether the upstream refused access, which may be host specific.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, DataConnectorError::Status { status: 403, .. })
    }

    /// Whether the error stems from caller input rather than the upstream.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DataConnectorError::EmptyBaseUrl
                | DataConnectorError::InvalidBaseUrl { .. }
        )
    }
}
