use crate::fleet_api::api_error_v1::{ApiV1Detail, ApiV1Error};
use crate::shared::extractors::payload;
use crate::shared::extractors::payload::Payload;
use crate::shared::extractors::request_id::RequestId;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use thiserror::Error;
use uuid::Uuid;

/// ValidatedPayload uses the full request body and therefore should always appear after
/// other extractors that might implement FromRequestParts instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPayload<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedPayload<T>
where
    T: serde::de::DeserializeOwned + validator::Validate + std::any::Any,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        // Read the request id before the body consumes the request
        let RequestId(request_id) = RequestId::from_headers(req.headers());

        let Payload(value) = Payload::<T>::from_request(req, state)
            .await
            .map_err(|e| Error::Payload(e, request_id))?;

        match value.validate() {
            Ok(_) => Ok(ValidatedPayload(value)),
            Err(e) => Err(Error::Validation(e, request_id)),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed")]
    Validation(validator::ValidationErrors, Uuid),

    #[error("Payload error")]
    Payload(payload::Error, Uuid),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_api_v1_error().into_response()
    }
}

impl Error {
    pub fn into_api_v1_error(self) -> ApiV1Error {
        match self {
            Error::Validation(validation_errors, request_id) => {
                let details =
                    validation_errors_to_api_v1_details(&validation_errors);
                let message = details
                    .iter()
                    .map(|d| d.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                ApiV1Error::bad_request(
                    format!("Validation failed: {message}"),
                    details,
                    request_id.to_string(),
                )
            }
            Error::Payload(payload_err, request_id) => {
                payload_error_to_api_v1_error(&payload_err, &request_id)
            }
        }
    }
}

/// Transforms ValidationErrors into ApiV1Detail entries with specific field information.
fn validation_errors_to_api_v1_details(
    errors: &validator::ValidationErrors,
) -> Vec<ApiV1Detail> {
    let mut details = Vec::new();
    format_validation_errors_to_details_recursive(errors, None, &mut details);

    // If no specific field errors, return a generic error
    if details.is_empty() {
        details.push(ApiV1Detail {
            field: Some("request".to_string()),
            code: "validation_failed".to_string(),
            message: "Validation failed".to_string(),
            suggestion:
                "Check the request parameters and format of the request body"
                    .to_string(),
        });
    }

    details
}

/// Recursively formats ValidationErrors into ApiV1Detail entries.
fn format_validation_errors_to_details_recursive(
    errors: &validator::ValidationErrors,
    parent_path: Option<&str>,
    output: &mut Vec<ApiV1Detail>,
) {
    for (field, kind) in errors.errors() {
        let current_path = match parent_path {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let (field_name, message) = match current_path.as_str() {
                        // struct-level validation
                        "__all__" => {
                            let field = error.code.as_ref();
                            let message = error.message.clone().unwrap_or(
                                Cow::Owned("validation failed".to_string()),
                            );
                            (field.to_string(), message.to_string())
                        }
                        _ => {
                            let error_message =
                                error.message.as_ref().unwrap_or(&error.code);
                            (
                                current_path.clone(),
                                format!("`{current_path}` {error_message}"),
                            )
                        }
                    };

                    output.push(ApiV1Detail {
                        field: Some(field_name),
                        code: error.code.to_string(),
                        message,
                        suggestion: "Check the field value and format"
                            .to_string(),
                    });
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errors) => {
                format_validation_errors_to_details_recursive(
                    struct_errors,
                    Some(&current_path),
                    output,
                );
            }
            validator::ValidationErrorsKind::List(list_errors) => {
                for (index, item_errors) in list_errors {
                    let item_path = format!("{}[{}]", current_path, index);
                    format_validation_errors_to_details_recursive(
                        item_errors,
                        Some(&item_path),
                        output,
                    );
                }
            }
        }
    }
}

/// Converts payload::Error to ApiV1Error with specific field information extracted
/// from serde_path_to_error when available
pub(crate) fn payload_error_to_api_v1_error(
    payload_err: &payload::Error,
    request_id: &Uuid,
) -> ApiV1Error {
    match payload_err {
        payload::Error::Json(serde_err) => {
            let field_path = serde_err.path().to_string();
            let inner_message = serde_err.inner().to_string();

            let (field, message, code) = if field_path.is_empty()
                || field_path == "."
            {
                match extract_missing_field_from_message(&inner_message) {
                    Some(missing_field) => (
                        missing_field.clone(),
                        format!("Missing required field: {}", missing_field),
                        "missing_field".to_string(),
                    ),
                    None => (
                        "request".to_string(),
                        format!("Invalid JSON: {}", inner_message),
                        "invalid_json".to_string(),
                    ),
                }
            } else {
                let field_name =
                    extract_nested_field_name(&field_path, &inner_message);
                let message = if inner_message.contains("missing field") {
                    format!("Missing required field: {}", field_name)
                } else {
                    format!(
                        "Invalid value for field '{}': {}",
                        field_name, inner_message
                    )
                };
                (field_name, message, "invalid_field".to_string())
            };

            ApiV1Error::bad_request(
                message.clone(),
                vec![ApiV1Detail {
                    field: Some(field),
                    code,
                    message,
                    suggestion: "Check the field value and format".to_string(),
                }],
                request_id.to_string(),
            )
        }
        payload::Error::MissingJsonContentType => ApiV1Error::bad_request(
            "Missing content-type header".to_string(),
            vec![ApiV1Detail {
                field: Some("Content-Type".to_string()),
                code: "missing_content_type".to_string(),
                message: "Content-Type header must be application/json"
                    .to_string(),
                suggestion: "Set Content-Type header to application/json"
                    .to_string(),
            }],
            request_id.to_string(),
        ),
        payload::Error::Bytes(_) => ApiV1Error::bad_request(
            "Request body error".to_string(),
            vec![ApiV1Detail {
                field: Some("request".to_string()),
                code: "request_body_error".to_string(),
                message: "Unable to read request body".to_string(),
                suggestion: "Check the request body and content length"
                    .to_string(),
            }],
            request_id.to_string(),
        ),
    }
}

/// Extracts the nested field name from the path and error message
fn extract_nested_field_name(field_path: &str, inner_message: &str) -> String {
    match extract_missing_field_from_message(inner_message) {
        Some(missing_field) if inner_message.contains("missing field") => {
            format!("{}.{}", field_path, missing_field)
        }
        _ => field_path.to_string(),
    }
}

/// Extracts the specific field name from a serde "missing field" error message
/// Example: "missing field `mygServer`" -> Some("mygServer")
fn extract_missing_field_from_message(message: &str) -> Option<String> {
    let start = message.find("missing field")?;
    let after_missing = &message[start + "missing field".len()..];

    if let Some(backtick_start) = after_missing.find('`')
        && let Some(backtick_end) =
            after_missing[backtick_start + 1..].find('`')
    {
        let field_name = &after_missing
            [backtick_start + 1..backtick_start + 1 + backtick_end];
        return Some(field_name.to_string());
    }

    if let Some(quote_start) = after_missing.find('"')
        && let Some(quote_end) = after_missing[quote_start + 1..].find('"')
    {
        let field_name =
            &after_missing[quote_start + 1..quote_start + 1 + quote_end];
        return Some(field_name.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_field_names() {
        assert_eq!(
            extract_missing_field_from_message(
                "missing field `mygServer` at line 1 column 2"
            ),
            Some("mygServer".to_string())
        );
        assert_eq!(
            extract_missing_field_from_message("missing field \"to\""),
            Some("to".to_string())
        );
        assert_eq!(extract_missing_field_from_message("expected a date"), None);
    }

    #[test]
    fn nested_path_includes_missing_field() {
        assert_eq!(
            extract_nested_field_name("filters", "missing field `from`"),
            "filters.from"
        );
        assert_eq!(
            extract_nested_field_name("metric", "unknown variant `speed`"),
            "metric"
        );
    }
}
