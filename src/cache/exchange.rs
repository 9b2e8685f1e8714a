//! Client-credentials exchange against the authorization endpoint.
//!
//! Wire contract: `POST <auth_url>` with `Authorization: Basic base64(id:secret)`,
//! `Content-Type: application/x-www-form-urlencoded` and the body
//! `grant_type=client_credentials`. A 2xx JSON body must carry a non-empty string
//! `access_token` usable in an `Authorization` header and a positive integer `expires_in`;
//! every other field is ignored.

// crates.io
use http::{
	HeaderValue, Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::{CachedToken, TokenCacheConfig},
	error::AuthError,
	transport::{HttpRequest, HttpTransport, RequestTimeout},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const CLIENT_CREDENTIALS_FORM: &str = "grant_type=client_credentials";

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: i64,
}

/// Performs one exchange and stamps the resulting token relative to `now`.
pub(crate) async fn client_credentials<T>(
	config: &TokenCacheConfig,
	transport: &T,
	now: OffsetDateTime,
) -> Result<CachedToken, AuthError>
where
	T: ?Sized + HttpTransport,
{
	let request = build_request(config)?;
	let response = transport.send(request).await.map_err(|err| {
		if transport.is_timeout(&err) { AuthError::timeout(err) } else { AuthError::transport(err) }
	})?;
	let status = response.status();
	let body = response.body();

	if !status.is_success() {
		return Err(AuthError::unexpected_status(status.as_u16(), body));
	}

	parse_token(status.as_u16(), body, now)
}

fn build_request(config: &TokenCacheConfig) -> Result<HttpRequest, AuthError> {
	http::Request::builder()
		.method(Method::POST)
		.uri(config.auth_url.as_str())
		.header(AUTHORIZATION, config.credentials.basic_authorization())
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
		.header(ACCEPT, "application/json")
		.extension(RequestTimeout(config.request_timeout))
		.body(CLIENT_CREDENTIALS_FORM.as_bytes().to_vec())
		.map_err(AuthError::transport)
}

fn parse_token(status: u16, body: &[u8], now: OffsetDateTime) -> Result<CachedToken, AuthError> {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let parsed: TokenResponse = serde_path_to_error::deserialize(de).map_err(|err| {
		let detail = format!("cannot decode `{}`", err.path());

		AuthError::malformed(status, body, detail, Some(Arc::new(err)))
	})?;

	if parsed.access_token.is_empty() {
		return Err(AuthError::malformed(status, body, "`access_token` is empty", None));
	}
	if HeaderValue::from_str(&parsed.access_token).is_err() {
		return Err(AuthError::malformed(
			status,
			body,
			"`access_token` is not a valid header value",
			None,
		));
	}
	if parsed.expires_in <= 0 {
		return Err(AuthError::malformed(status, body, "`expires_in` must be positive", None));
	}

	let expires_at = now
		.checked_add(Duration::seconds(parsed.expires_in))
		.ok_or_else(|| AuthError::malformed(status, body, "`expires_in` is out of range", None))?;

	Ok(CachedToken { value: TokenSecret::new(parsed.access_token), expires_at })
}
