/// Error detail middleware
///
/// Internal errors leave the handler as a generic
/// `{"message": "Internal server error"}` body with the real cause stored in
/// an [`ErrorDetail`] response extension. Outside production this layer
/// rewrites such responses to also carry the cause as `stack`. In production
/// it only strips the extension.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use taskdesk_api::middleware::errors::ErrorDetailLayer;
///
/// let app: Router = Router::new()
///     .layer(ErrorDetailLayer::new(true)); // true = expose detail (development)
/// ```

use crate::error::{ErrorDetail, ErrorResponse, INTERNAL_ERROR_MESSAGE};
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
    Json,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Error detail middleware layer
#[derive(Clone)]
pub struct ErrorDetailLayer {
    /// Whether the internal cause is written into the body
    expose: bool,
}

impl ErrorDetailLayer {
    /// Creates a new error detail layer
    ///
    /// # Arguments
    ///
    /// * `expose` - Whether to add the `stack` field (use false for production)
    pub fn new(expose: bool) -> Self {
        Self { expose }
    }
}

impl<S> Layer<S> for ErrorDetailLayer {
    type Service = ErrorDetailMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorDetailMiddleware {
            inner,
            expose: self.expose,
        }
    }
}

/// Error detail middleware service
#[derive(Clone)]
pub struct ErrorDetailMiddleware<S> {
    inner: S,
    expose: bool,
}

impl<S> Service<Request> for ErrorDetailMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let expose = self.expose;

        Box::pin(async move {
            let mut response = future.await?;

            let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
                return Ok(response);
            };

            if !expose {
                return Ok(response);
            }

            let status = response.status();
            let body = Json(ErrorResponse {
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                stack: Some(detail),
            });

            Ok((status, body).into_response())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::Service as _;

    async fn failing() -> ApiError {
        ApiError::InternalError("Database error: pool timed out".to_string())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn call(expose: bool) -> Response {
        let mut app = Router::new()
            .route("/fail", get(failing))
            .layer(ErrorDetailLayer::new(expose));

        app.call(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_detail_exposed_in_development() {
        let response = call(true).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["stack"], "Database error: pool timed out");
    }

    #[tokio::test]
    async fn test_detail_hidden_in_production() {
        let response = call(false).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ErrorDetail>().is_none());

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_client_errors_untouched() {
        async fn missing() -> ApiError {
            ApiError::NotFound("Task not found".to_string())
        }

        let mut app = Router::new()
            .route("/missing", get(missing))
            .layer(ErrorDetailLayer::new(true));

        let response = app
            .call(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Task not found");
        assert!(body.get("stack").is_none());
    }
}
