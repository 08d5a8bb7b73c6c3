use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::payload_error_to_api_v1_error;

/// JSON body extractor that reports the path of the offending field.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if json_content_type(req.headers()) {
            let bytes = Bytes::from_request(req, state).await?;
            let deserializer =
                &mut serde_json::Deserializer::from_slice(&bytes);
            let value: T = serde_path_to_error::deserialize(deserializer)?;

            Ok(Payload(value))
        } else {
            Err(Error::MissingJsonContentType)
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bytes(#[from] BytesRejection),

    #[error(transparent)]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("missing content-type header")]
    MissingJsonContentType,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let RequestId(request_id) = RequestId::from_headers(&HeaderMap::new());
        payload_error_to_api_v1_error(&self, &request_id).into_response()
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let Ok(mime) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json"
            || mime.suffix().is_some_and(|name| name == "json"))
}
