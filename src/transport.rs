//! Transport primitives shared by the token cache and the charge clients.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Requests and responses
//! are plain [`http`] values with buffered bodies so token exchanges and provider calls can be
//! exercised against scripted transports in tests. Each request may carry a
//! [`RequestTimeout`] extension; transports are expected to honor it and to report an elapsed
//! timeout through [`HttpTransport::is_timeout`].

// self
use crate::_prelude::*;

/// Outbound request with a fully buffered body.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Inbound response with a fully buffered body.
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Upper bound for a single request, attached as an [`http::Extensions`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTimeout(pub StdDuration);

/// Abstraction over HTTP clients used for token exchanges and provider calls.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by a
/// token cache and the charge clients built on top of it, and the futures they return must be
/// `Send` so callers can drive them from multi-threaded executors.
///
/// The returned future must resolve once the request's [`RequestTimeout`] elapses. The token
/// cache holds its refresh gate for the whole exchange, so a transport that ignores the
/// extension stalls every caller of that cache until the request finishes.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches `request` and buffers the full response body.
	///
	/// Non-2xx statuses are successful transport outcomes; only network-level failures
	/// resolve to `Err`.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;

	/// Returns `true` when `error` represents an elapsed [`RequestTimeout`].
	fn is_timeout(&self, error: &Self::TransportError) -> bool {
		let _ = error;

		false
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so [`ReqwestHttpClient::new`] disables redirect following.
/// Apply the same policy to any client passed to [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = into_reqwest_request(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut buffered = HttpResponse::new(response.bytes().await?.to_vec());

			*buffered.status_mut() = status;
			*buffered.version_mut() = version;
			*buffered.headers_mut() = headers;

			Ok::<_, ReqwestError>(buffered)
		})
	}

	fn is_timeout(&self, error: &Self::TransportError) -> bool {
		error.is_timeout()
	}
}

#[cfg(feature = "reqwest")]
fn into_reqwest_request(request: HttpRequest) -> Result<reqwest::Request, ReqwestError> {
	let timeout = request.extensions().get::<RequestTimeout>().copied();
	let mut request = reqwest::Request::try_from(request)?;

	if let Some(RequestTimeout(limit)) = timeout {
		*request.timeout_mut() = Some(limit);
	}

	Ok(request)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn reqwest_client_builds_without_redirects() {
		let client = ReqwestHttpClient::new().expect("Reqwest client should build.");

		assert!(format!("{:?}", client.as_ref()).contains("Client"));
	}

	#[test]
	fn timeout_extension_round_trips_through_requests() {
		let request = http::Request::builder()
			.uri("https://example.com/token")
			.extension(RequestTimeout(StdDuration::from_secs(3)))
			.body(Vec::<u8>::new())
			.expect("Request should build.");

		assert_eq!(
			request.extensions().get::<RequestTimeout>(),
			Some(&RequestTimeout(StdDuration::from_secs(3)))
		);
	}

	#[test]
	fn reqwest_requests_carry_the_timeout_extension() {
		let request = http::Request::builder()
			.method(http::Method::POST)
			.uri("https://auth.example.com/oauth/token")
			.extension(RequestTimeout(StdDuration::from_millis(250)))
			.body(b"grant_type=client_credentials".to_vec())
			.expect("Request should build.");
		let request = into_reqwest_request(request).expect("Request should convert.");

		assert_eq!(request.timeout(), Some(&StdDuration::from_millis(250)));
		assert_eq!(request.method(), reqwest::Method::POST);

		let untimed = http::Request::builder()
			.uri("https://auth.example.com/oauth/token")
			.body(Vec::<u8>::new())
			.expect("Request should build.");

		assert_eq!(into_reqwest_request(untimed).expect("Request should convert.").timeout(), None);
	}
}
