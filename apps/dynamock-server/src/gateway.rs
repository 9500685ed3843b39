//! Gateway in front of the table service.
//!
//! Health-check requests (`/_localstack/health`, `/_health`, `/health`) are
//! answered here; every other request goes to the `awsJson1_0` service.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;

use dynamock_http::body::DynamoDBResponseBody;
use dynamock_http::dispatch::DynamoDBHandler;
use dynamock_http::service::DynamoDBHttpService;

/// Body of the health-check response.
const HEALTH_BODY: &str = r#"{"services":{"dynamodb":"running"}}"#;

/// Routes health checks locally and everything else to the table service.
#[derive(Debug)]
pub struct GatewayService<H: DynamoDBHandler> {
    dynamodb: DynamoDBHttpService<H>,
}

impl<H: DynamoDBHandler> GatewayService<H> {
    /// Create a gateway around the table service.
    pub fn new(dynamodb: DynamoDBHttpService<H>) -> Self {
        Self { dynamodb }
    }
}

impl<H: DynamoDBHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            dynamodb: self.dynamodb.clone(),
        }
    }
}

impl<H: DynamoDBHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = http::Response<DynamoDBResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response()) });
        }
        let ddb = self.dynamodb.clone();
        Box::pin(async move { ddb.call(req).await })
    }
}

/// Check if the request is a health check.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET
        && (path == "/_localstack/health" || path == "/_health" || path == "/health")
}

fn health_check_response() -> http::Response<DynamoDBResponseBody> {
    let mut response =
        http::Response::new(DynamoDBResponseBody::from_json(HEALTH_BODY.as_bytes().to_vec()));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
