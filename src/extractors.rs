use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// `axum::Json<T>` that rejects with the `AppError` envelope instead of
/// axum's plain-text body.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| JsonBody(value))
            .map_err(rejection_to_app_error)
    }
}

fn rejection_to_app_error(rejection: JsonRejection) -> AppError {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "data",
        JsonRejection::JsonSyntaxError(_) => "syntax",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        JsonRejection::BytesRejection(_) => "bytes",
        _ => "other",
    };
    tracing::warn!(kind, error = %rejection, "Rejected JSON request body");
    AppError::bad_request("INVALID_REQUEST_BODY", "Invalid request body")
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let req = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = JsonBody::<Payload>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_REQUEST_BODY");
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let req = Request::builder()
            .body(Body::from(r#"{"name":"x"}"#))
            .unwrap();

        let err = JsonBody::<Payload>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
