//! Transport primitives for outbound platform calls.
//!
//! [`ServiceHttpClient`] is the bridge's only dependency on an HTTP stack.
//! Callers provide an implementation (typically behind `Arc<T>`); the
//! default reqwest-backed client ships behind the `reqwest` feature.
//! Redirect following stays disabled in spirit: a platform endpoint answers
//! directly or the call fails closed.

// self
use crate::_prelude::*;

/// Boxed response future returned by transports.
pub type ServiceFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ServiceResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute platform calls.
pub trait ServiceHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes one request to completion, returning status and body.
	fn execute(&self, request: ServiceRequest) -> ServiceFuture<'_, Self::TransportError>;
}

/// HTTP method subset the platform contract uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Query-string request.
	Get,
	/// JSON-body request.
	Post,
}

/// One outbound request: method, URL, headers, and optional body.
#[derive(Clone, Debug)]
pub struct ServiceRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Fully-formed request URL, query included.
	pub url: Url,
	/// Header name/value pairs.
	pub headers: Vec<(&'static str, String)>,
	/// Request body, when posting.
	pub body: Option<Vec<u8>>,
}
impl ServiceRequest {
	/// Builds a GET request for the URL.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, headers: Vec::new(), body: None }
	}

	/// Builds a POST request carrying a JSON body.
	pub fn post_json(url: Url, body: Vec<u8>) -> Self {
		Self {
			method: HttpMethod::Post,
			url,
			headers: vec![("Content-Type", "application/json".into())],
			body: Some(body),
		}
	}

	/// Appends a header pair.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}
}

/// Raw response surfaced to the caller for status checks and decoding.
#[derive(Clone, Debug)]
pub struct ServiceResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ServiceResponse {
	/// Whether the platform answered 200; anything else fails closed.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in
/// one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ServiceHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ServiceRequest) -> ServiceFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				HttpMethod::Get => client.get(request.url),
				HttpMethod::Post => client.post(request.url),
			};

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ServiceResponse { status, body })
		})
	}
}
