//! OAuth 2.0 client credentials and their HTTP Basic encoding.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Immutable client identifier + secret pair used for the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: String,
	client_secret: TokenSecret,
}
impl Credentials {
	/// Validates and stores a client identifier + secret pair.
	///
	/// The identifier must be non-empty and colon-free (HTTP Basic splits on the first `:`);
	/// the secret must be non-empty.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = TokenSecret::new(client_secret);

		if client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}
		if client_id.contains(':') {
			return Err(ConfigError::ClientIdContainsColon);
		}
		if client_secret.is_empty() {
			return Err(ConfigError::MissingClientSecret);
		}

		Ok(Self { client_id, client_secret })
	}

	/// Returns the client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Returns the redacted client secret.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// Builds the `Authorization` header value: `Basic base64(client_id:client_secret)`.
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}
