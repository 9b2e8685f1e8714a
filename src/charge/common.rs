//! Shared request plumbing for provider clients (endpoint joining, bearer auth, JSON decoding).

// crates.io
use http::{
	Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::BearerTokenSource,
	error::{ConfigError, ProviderError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::{HttpTransport, RequestTimeout},
};

const JSON: &str = "application/json";

/// One authenticated JSON call against a provider.
pub(crate) struct ProviderRequest {
	kind: FlowKind,
	method: Method,
	url: Url,
	body: Option<Vec<u8>>,
	timeout: StdDuration,
}
impl ProviderRequest {
	pub(crate) fn get(kind: FlowKind, url: Url, timeout: StdDuration) -> Self {
		Self { kind, method: Method::GET, url, body: None, timeout }
	}

	pub(crate) fn post_json(
		kind: FlowKind,
		url: Url,
		payload: &impl Serialize,
		timeout: StdDuration,
	) -> Result<Self> {
		let body = serde_json::to_vec(payload)
			.map_err(|e| Error::invalid_request(format!("payload cannot be encoded: {e}")))?;

		Ok(Self { kind, method: Method::POST, url, body: Some(body), timeout })
	}
}

/// Appends `segments` (percent-encoded) to the path of `base`.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::UnsupportedUrl { field: "provider", url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

/// Fetches a bearer token, sends `call`, and decodes a 2xx JSON answer into `R`.
///
/// Token failures surface as [`Error::Auth`] before anything is sent to the provider.
pub(crate) async fn send_json<T, R>(
	transport: &T,
	tokens: &dyn BearerTokenSource,
	call: ProviderRequest,
) -> Result<R>
where
	T: ?Sized + HttpTransport,
	R: DeserializeOwned,
{
	let kind = call.kind;
	let span = FlowSpan::new(kind, "send_json");
	let result = span.instrument(execute(transport, tokens, call)).await;

	match &result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
			obs::log_flow_failure(kind, e);
		},
	}

	result
}

async fn execute<T, R>(transport: &T, tokens: &dyn BearerTokenSource, call: ProviderRequest) -> Result<R>
where
	T: ?Sized + HttpTransport,
	R: DeserializeOwned,
{
	let operation = call.kind.as_str();
	let token = tokens.bearer_token().await?;
	let mut builder = http::Request::builder()
		.method(call.method)
		.uri(call.url.as_str())
		.header(AUTHORIZATION, token.bearer_header())
		.header(ACCEPT, JSON)
		.extension(RequestTimeout(call.timeout));

	if call.body.is_some() {
		builder = builder.header(CONTENT_TYPE, JSON);
	}

	let request = builder.body(call.body.unwrap_or_default()).map_err(ConfigError::from)?;

	obs::record_flow_outcome(call.kind, FlowOutcome::Attempt);

	let response = transport
		.send(request)
		.await
		.map_err(|err| ProviderError::transport(operation, transport.is_timeout(&err), err))?;
	let status = response.status().as_u16();

	if !response.status().is_success() {
		return Err(ProviderError::Rejected {
			operation,
			status,
			body: crate::error::body_preview(response.body()),
		}
		.into());
	}

	let de = &mut serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(de)
		.map_err(|source| ProviderError::MalformedResponse { operation, status, source }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_appends_encoded_segments() {
		let base = Url::parse("https://api.example.com/v1/").expect("URL should parse.");
		let url = endpoint(&base, &["orders", "ORDE/1 2"]).expect("Endpoint should build.");

		assert_eq!(url.as_str(), "https://api.example.com/v1/orders/ORDE%2F1%202");

		let bare = Url::parse("https://api.example.com").expect("URL should parse.");

		assert_eq!(
			endpoint(&bare, &["v2", "cob"]).expect("Endpoint should build.").as_str(),
			"https://api.example.com/v2/cob"
		);
	}

	#[test]
	fn opaque_bases_are_rejected() {
		let base = Url::parse("mailto:ops@example.com").expect("URL should parse.");

		assert!(matches!(
			endpoint(&base, &["orders"]),
			Err(Error::Config(ConfigError::UnsupportedUrl { field: "provider", .. }))
		));
	}
}
