use data_connector_client::DataConnectorError;
use mygeotab_client::MyGeotabError;
use thiserror::Error;

pub type FleetQueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    MyGeotab(#[from] MyGeotabError),

    #[error(transparent)]
    DataConnector(DataConnectorError),
}

impl From<DataConnectorError> for QueryError {
    fn from(error: DataConnectorError) -> Self {
        if error.is_invalid_input() {
            QueryError::InvalidInput(error.to_string())
        } else {
            QueryError::DataConnector(error)
        }
    }
}

impl QueryError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, QueryError::InvalidInput(_))
    }

    /// Stable code used for metrics labels and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidInput(_) => "invalid_input",
            QueryError::MyGeotab(_) => "mygeotab_error",
            QueryError::DataConnector(_) => "data_connector_error",
        }
    }
}
