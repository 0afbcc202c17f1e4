//! Outbound request execution.
//!
//! # Responsibilities
//! - Build the outbound request (method, resolved URL, streamed body)
//! - Filter hop-by-hop headers and add the gateway headers
//! - Bound the whole round trip with one deadline
//! - Hand back a client-facing response with a streaming body

use std::net::IpAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time::Instant;
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use crate::http::response::{DeadlineBody, StreamContext};
use crate::security::headers::copy_headers;

/// Value of the `X-Gateway` header on every proxied request.
pub const GATEWAY_ID: &str = "api-gateway";

pub static X_GATEWAY: HeaderName = HeaderName::from_static("x-gateway");
pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub static X_ORIGINAL_HOST: HeaderName = HeaderName::from_static("x-original-host");

/// HTTP client used for upstream calls.
pub type HttpClient = Client<HttpConnector, Body>;

/// Inbound request pieces the executor forwards.
#[derive(Debug)]
pub struct Outbound<'a> {
    pub method: Method,
    pub target: &'a Url,
    pub headers: &'a HeaderMap,
    pub body: Body,
    pub client_ip: Option<IpAddr>,
    pub context: StreamContext,
}

/// Executes proxied requests against backends.
#[derive(Clone)]
pub struct ProxyExecutor {
    client: HttpClient,
    timeout: Duration,
}

impl ProxyExecutor {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Send the request upstream and return the streaming response.
    ///
    /// Errors only surface before the response head arrives. Failures while
    /// the body streams are reported through the body itself.
    pub async fn execute(&self, outbound: Outbound<'_>) -> GatewayResult<Response<Body>> {
        let deadline = Instant::now() + self.timeout;
        let target = outbound.target.as_str();

        let uri: Uri = target.parse().map_err(|e: axum::http::uri::InvalidUri| {
            GatewayError::InvalidTargetUrl {
                url: target.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut request = Request::new(outbound.body);
        *request.method_mut() = outbound.method;
        *request.uri_mut() = uri;

        let headers = request.headers_mut();
        copy_headers(outbound.headers, headers);
        // The client sets Host from the target URI; the original goes in X-Original-Host.
        headers.remove(header::HOST);
        apply_gateway_headers(headers, outbound.headers, outbound.client_ip);

        let response = match tokio::time::timeout_at(deadline, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(GatewayError::UpstreamUnreachable {
                    target: target.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(GatewayError::UpstreamUnreachable {
                    target: target.to_string(),
                    reason: format!("no response within {}s", self.timeout.as_secs()),
                })
            }
        };

        let (parts, body) = response.into_parts();
        let mut client_response =
            Response::new(Body::new(DeadlineBody::new(body, deadline, outbound.context)));
        *client_response.status_mut() = parts.status;
        copy_headers(&parts.headers, client_response.headers_mut());

        Ok(client_response)
    }
}

/// Add `X-Gateway`, `X-Forwarded-For` and `X-Original-Host`.
fn apply_gateway_headers(outbound: &mut HeaderMap, inbound: &HeaderMap, client_ip: Option<IpAddr>) {
    outbound.insert(X_GATEWAY.clone(), HeaderValue::from_static(GATEWAY_ID));

    if let Some(ip) = client_ip {
        if let Ok(value) = HeaderValue::from_str(&ip.to_string()) {
            outbound.insert(X_FORWARDED_FOR.clone(), value);
        }
    }

    if let Some(host) = inbound.get(header::HOST) {
        outbound.insert(X_ORIGINAL_HOST.clone(), host.clone());
    }
}
