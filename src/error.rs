//! Error taxonomy shared by the token cache, charge clients, and configuration loaders.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed transport error.
pub type BoxError = Box<dyn StdError + Send + Sync>;
/// Reference-counted error source so [`AuthError`] stays cloneable.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical error exposed by charge clients and the checkout service.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Bearer token acquisition failed; the provider was never called.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The payment provider failed or rejected the call.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// Caller input failed validation before any network call.
	#[error("Request is invalid: {reason}.")]
	InvalidRequest {
		/// Human-readable validation failure.
		reason: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidRequest`].
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}
}

/// Failure categories for token acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
	/// DNS, connect, TLS, or request construction failure.
	Transport,
	/// The token request exceeded its timeout.
	Timeout,
	/// The authorization server answered with a non-2xx status.
	UnexpectedStatus,
	/// A 2xx body was not JSON or lacked a usable `access_token`/`expires_in`.
	MalformedResponse,
}
impl AuthErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthErrorKind::Transport => "transport",
			AuthErrorKind::Timeout => "timeout",
			AuthErrorKind::UnexpectedStatus => "unexpected_status",
			AuthErrorKind::MalformedResponse => "malformed_response",
		}
	}
}
impl Display for AuthErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token acquisition failure.
///
/// Cloneable so that every caller waiting on a shared refresh receives the same failure.
#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct AuthError {
	/// Failure category.
	pub kind: AuthErrorKind,
	/// HTTP status returned by the authorization server, when one was received.
	pub status: Option<u16>,
	/// Preview of the response body, when one was received.
	pub body: Option<String>,
	/// Human-readable summary.
	pub message: String,
	/// Underlying transport or parsing failure.
	#[source]
	pub source: Option<SharedError>,
}
impl AuthError {
	/// Wraps a transport-level failure (no status, no body).
	pub fn transport(src: impl 'static + Send + Sync + StdError) -> Self {
		Self {
			kind: AuthErrorKind::Transport,
			status: None,
			body: None,
			message: "Network error occurred while calling the token endpoint.".into(),
			source: Some(Arc::new(src)),
		}
	}

	/// Wraps a transport failure that the transport classified as a timeout.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self {
			kind: AuthErrorKind::Timeout,
			status: None,
			body: None,
			message: "Request timed out while calling the token endpoint.".into(),
			source: Some(Arc::new(src)),
		}
	}

	/// Records a non-2xx answer from the authorization server.
	pub fn unexpected_status(status: u16, body: &[u8]) -> Self {
		Self {
			kind: AuthErrorKind::UnexpectedStatus,
			status: Some(status),
			body: body_preview(body),
			message: format!("Token endpoint returned HTTP {status}."),
			source: None,
		}
	}

	/// Records a 2xx answer whose body could not be used.
	pub fn malformed(
		status: u16,
		body: &[u8],
		detail: impl Display,
		source: Option<SharedError>,
	) -> Self {
		Self {
			kind: AuthErrorKind::MalformedResponse,
			status: Some(status),
			body: body_preview(body),
			message: format!("Token endpoint returned a malformed response: {detail}."),
			source,
		}
	}

	/// Returns `true` when the failure was a timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self.kind, AuthErrorKind::Timeout)
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// A configured URL uses a scheme other than `http`/`https` or cannot carry a path.
	#[error("The {field} URL must be an absolute http(s) URL: {url}.")]
	UnsupportedUrl {
		/// Which configuration field failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Client identifier is empty.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Client identifier contains a colon, which HTTP Basic cannot carry.
	#[error("Client identifier cannot contain ':'.")]
	ClientIdContainsColon,
	/// Client secret is empty.
	#[error("Client secret cannot be empty.")]
	MissingClientSecret,
	/// Static bearer token is empty after sanitization.
	#[error("Static bearer token cannot be empty.")]
	EmptyToken,
	/// Environment variable holding a static token is not set or not UTF-8.
	#[error("Environment variable `{var}` is not set.")]
	MissingEnv {
		/// Variable name.
		var: String,
	},
	/// PIX key for the cob API is empty.
	#[error("PIX key cannot be empty.")]
	MissingPixKey,
	/// Configuration document could not be read.
	#[error("Failed to read configuration from {path}.")]
	Read {
		/// Path of the configuration document.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document is not valid JSON or does not match the schema.
	#[error("Configuration is invalid at `{path}`.", path = .source.path())]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Payment provider failures, kept apart from [`AuthError`] so callers can tell a broken
/// credential from a refused charge.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// Provider answered with a non-2xx status.
	#[error("Provider rejected the {operation} call with HTTP {status}.")]
	Rejected {
		/// Operation label.
		operation: &'static str,
		/// HTTP status code.
		status: u16,
		/// Preview of the response body.
		body: Option<String>,
	},
	/// Provider answered 2xx with a body that does not match the expected shape.
	#[error("Provider returned a malformed {operation} response.")]
	MalformedResponse {
		/// Operation label.
		operation: &'static str,
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Network failure while calling the provider.
	#[error("Network error occurred during the {operation} call.")]
	Transport {
		/// Operation label.
		operation: &'static str,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// The provider call exceeded its timeout.
	#[error("The {operation} call timed out.")]
	Timeout {
		/// Operation label.
		operation: &'static str,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}
impl ProviderError {
	/// Wraps a transport failure, classifying it as a timeout when `timed_out` is set.
	pub fn transport(
		operation: &'static str,
		timed_out: bool,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		if timed_out {
			Self::Timeout { operation, source: Box::new(src) }
		} else {
			Self::Transport { operation, source: Box::new(src) }
		}
	}
}

/// Lossy UTF-8 preview of a response body, truncated for diagnostics.
pub(crate) fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(text.into_owned());
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	Some(buf)
}
