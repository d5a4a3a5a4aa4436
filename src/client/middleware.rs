// File: ./src/client/middleware.rs
//! Tower middleware stamping every API request with a User-Agent and a fresh
//! `X-Request-Id`, which the server uses to de-duplicate retried writes.
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::Request;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;
use uuid::Uuid;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn default_user_agent() -> String {
    format!("nextaction/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Clone, Debug)]
pub struct ApiHeadersLayer {
    user_agent: HeaderValue,
}

impl ApiHeadersLayer {
    pub fn new(user_agent: &str) -> Self {
        let user_agent = HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("nextaction"));
        Self { user_agent }
    }
}

impl<S> Layer<S> for ApiHeadersLayer {
    type Service = ApiHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiHeaders {
            inner,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiHeaders<S> {
    inner: S,
    user_agent: HeaderValue,
}

impl<S, ReqBody> Service<Request<ReqBody>> for ApiHeaders<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let headers = req.headers_mut();
        headers.insert(USER_AGENT, self.user_agent.clone());
        if !headers.contains_key(&REQUEST_ID)
            && let Ok(id) = HeaderValue::from_str(&Uuid::new_v4().to_string())
        {
            headers.insert(REQUEST_ID, id);
        }
        self.inner.call(req)
    }
}
