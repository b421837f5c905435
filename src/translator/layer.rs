use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::{IntoResponse, Response},
    BoxError,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::convert::Infallible;
use std::error::Error;
use std::panic::AssertUnwindSafe;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

use super::{BufferedResponse, ExceptionTranslator, FailureContext, REQUEST_ID_HEADER};
use crate::errors::{PanicFailure, RaisedFailure};

/// Tower layer installing an [`ExceptionTranslator`] in front of a service
#[derive(Debug, Clone, Default)]
pub struct TranslatorLayer {
    translator: ExceptionTranslator,
}

impl TranslatorLayer {
    pub fn new(translator: ExceptionTranslator) -> Self {
        Self { translator }
    }
}

impl<S> Layer<S> for TranslatorLayer {
    type Service = TranslatorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TranslatorService {
            inner,
            translator: self.translator.clone(),
        }
    }
}

/// Service wrapper that never fails: every request ends in a response.
///
/// Three kinds of downstream failure are translated: an `Err` from the inner
/// service, a panic while it runs, and a handler returning `Err(Failure)`.
#[derive(Debug, Clone)]
pub struct TranslatorService<S> {
    inner: S,
    translator: ExceptionTranslator,
}

impl<S> Service<Request<Body>> for TranslatorService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the inner service is awaited per call so its errors get translated
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let translator = self.translator.clone();
        let inner = self.inner.clone();
        let context = FailureContext::from_request(&request);

        Box::pin(async move {
            let result = AssertUnwindSafe(call_inner(inner, request))
                .catch_unwind()
                .await;

            let response = match result {
                Ok(Ok(mut response)) => match response.extensions_mut().remove::<RaisedFailure>() {
                    None => response,
                    Some(RaisedFailure(failure)) => translate(&translator, &*failure, &context),
                },
                Ok(Err(err)) => translate(&translator, &*err, &context),
                Err(payload) => {
                    let failure = PanicFailure::from_payload(payload);
                    translate(&translator, &failure, &context)
                }
            };

            Ok(response)
        })
    }
}

async fn call_inner<S>(mut inner: S, request: Request<Body>) -> Result<Response, BoxError>
where
    S: Service<Request<Body>, Response = Response>,
    S::Error: Into<BoxError>,
{
    let service = inner.ready().await.map_err(Into::into)?;
    service.call(request).await.map_err(Into::into)
}

fn translate(
    translator: &ExceptionTranslator,
    failure: &(dyn Error + 'static),
    context: &FailureContext,
) -> Response {
    let body = translator.translate(failure, context);

    let mut writer = BufferedResponse::new();
    translator.write_response(&mut writer, &body, context);

    let mut response = writer.into_response();
    if let Ok(request_id) = HeaderValue::from_str(&context.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Failure, ValidationFailure};
    use axum::http::StatusCode;
    use serde_json::Value;
    use tower::service_fn;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request() -> Request<Body> {
        Request::builder()
            .uri("/orders")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_inner_error_is_translated() {
        let service = TranslatorLayer::default().layer(service_fn(|_req: Request<Body>| async {
            Err::<Response, BoxError>(Box::new(ValidationFailure::new(["qty must be positive"])))
        }));

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");

        let body = body_json(response).await;
        assert_eq!(body["code"], "00001");
        assert_eq!(body["errors"][0], "qty must be positive");
    }

    #[tokio::test]
    async fn test_raised_failure_replaces_placeholder() {
        let service = TranslatorLayer::default().layer(service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(Failure::unhandled("connection reset").into_response())
        }));

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<RaisedFailure>().is_none());

        let body = body_json(response).await;
        assert_eq!(body["message"], "Unhandled error");
        assert_eq!(body["errors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_raised_unhandled_never_exposes_wrapped_validation() {
        let service = TranslatorLayer::default().layer(service_fn(|_req: Request<Body>| async {
            let failure = Failure::unhandled(ValidationFailure::new([
                "upstream billing api rejected account_id=998877",
            ]));
            Ok::<_, Infallible>(failure.into_response())
        }));

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"message": "Unhandled error", "errors": [], "code": "00009"})
        );
    }

    #[tokio::test]
    async fn test_success_is_untouched() {
        let service = TranslatorLayer::default().layer(service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>((StatusCode::ACCEPTED, "queued").into_response())
        }));

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.headers().get(REQUEST_ID_HEADER).is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"queued");
    }

    #[tokio::test]
    async fn test_panic_is_translated() {
        async fn explode(_req: Request<Body>) -> Result<Response, Infallible> {
            panic!("invariant violated")
        }

        let service = TranslatorLayer::default().layer(service_fn(explode));

        let response = service.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "00009");
        assert!(!body.to_string().contains("invariant"));
    }
}
