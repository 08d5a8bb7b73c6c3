use fleet_query::QueryError;
use uuid::Uuid;

use crate::fleet_api::api_error_v1::{ApiV1Detail, ApiV1Error};
use crate::fleet_api::error_recorder::IntoApiV1Error;

pub type HandlerResult<T> = Result<T, ApiV1Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl Error {
    pub fn to_api_v1_error(self, request_id: &Uuid) -> ApiV1Error {
        let Error::Query(e) = self;
        let code = e.code().to_string();

        match e {
            QueryError::InvalidInput(message) => ApiV1Error::bad_request(
                message.clone(),
                vec![ApiV1Detail {
                    field: None,
                    code,
                    message,
                    suggestion: "Check the request parameters".to_string(),
                }],
                request_id.to_string(),
            ),
            QueryError::MyGeotab(e) => ApiV1Error::bad_gateway(
                "MyGeotab request failed".to_string(),
                vec![ApiV1Detail {
                    field: None,
                    code,
                    message: e.to_string(),
                    suggestion: "Check the MyGeotab server and credentials"
                        .to_string(),
                }],
                request_id.to_string(),
            ),
            QueryError::DataConnector(e) => ApiV1Error::bad_gateway(
                "Data Connector request failed".to_string(),
                vec![ApiV1Detail {
                    field: None,
                    code,
                    message: e.to_string(),
                    suggestion:
                        "Check the Data Connector base URL and that the add-in is enabled for the database"
                            .to_string(),
                }],
                request_id.to_string(),
            ),
        }
    }
}

impl IntoApiV1Error for Error {
    fn code(&self) -> &'static str {
        let Error::Query(e) = self;
        e.code()
    }

    fn into_api_v1_error(self, request_id: &Uuid) -> ApiV1Error {
        self.to_api_v1_error(request_id)
    }
}
