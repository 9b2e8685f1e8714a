//! JSON configuration selecting one payment provider and its authentication mode.
//!
//! ```json
//! {
//!   "provider": {
//!     "kind": "pix_cob",
//!     "base_url": "https://pix.example.com",
//!     "pix_key": "payments@example.com",
//!     "oauth": {
//!       "auth_url": "https://pix.example.com/oauth/token",
//!       "client_id": "client",
//!       "client_secret": "secret"
//!     }
//!   },
//!   "vip": { "unit_amount_cents": 1000 }
//! }
//! ```
//!
//! `kind: "pagbank"` uses a static token instead, given inline (`token`) or read from the
//! environment variable named by `token_env` (default `PAGBANK_TOKEN`).

// std
use std::{fs, path::Path};
// self
use crate::{
	_prelude::*,
	auth::{BearerTokenSource, Credentials, StaticToken, TokenSecret},
	cache::{TokenCache, TokenCacheConfig},
	charge::{self, ChargeClient, DEFAULT_COB_EXPIRATION_SECS, PagBankClient, PixCobClient},
	error::ConfigError,
	transport::HttpTransport,
	vip::{VipCheckout, VipSettings},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestHttpClient;

/// Environment variable read for the PagBank token when none is configured.
pub const DEFAULT_TOKEN_ENV: &str = "PAGBANK_TOKEN";

/// Top-level gateway configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayConfig {
	/// Provider selection and credentials.
	pub provider: ProviderConfig,
	/// VIP checkout price and payer.
	#[serde(default)]
	pub vip: VipSettings,
	/// Upper bound for each provider call, in seconds.
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}
impl GatewayConfig {
	/// Parses a configuration document, reporting the JSON path of the first invalid field.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(de).map_err(|source| ConfigError::Parse { source })
	}

	/// Parses a configuration document held in a string.
	pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(s.as_bytes())
	}

	/// Reads and parses the configuration document at `path`.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json_slice(&bytes)
	}

	/// Per-call provider timeout.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.request_timeout_secs)
	}

	/// Builds the configured provider client on top of `transport`.
	///
	/// OAuth providers get a dedicated [`TokenCache`] sharing the same transport.
	pub fn charge_client<T>(
		&self,
		transport: impl Into<Arc<T>>,
	) -> Result<Arc<dyn ChargeClient>, ConfigError>
	where
		T: ?Sized + HttpTransport,
	{
		let transport = transport.into();
		let timeout = self.request_timeout();

		match &self.provider {
			ProviderConfig::Pagbank { base_url, token, token_env } => {
				let tokens: Arc<dyn BearerTokenSource> = Arc::new(match token {
					Some(token) => StaticToken::new(token.expose())?,
					None => StaticToken::from_env(token_env)?,
				});
				let client = PagBankClient::<T>::new(base_url.clone(), tokens, transport)?
					.with_request_timeout(timeout);

				Ok(Arc::new(client))
			},
			ProviderConfig::PixCob { base_url, pix_key, expiration_secs, oauth } => {
				let cache: Arc<dyn BearerTokenSource> = Arc::new(TokenCache::<T>::with_transport(
					oauth.token_cache_config()?,
					transport.clone(),
				));
				let client = PixCobClient::<T>::new(base_url.clone(), pix_key, cache, transport)?
					.with_expiration_secs(*expiration_secs)
					.with_request_timeout(timeout);

				Ok(Arc::new(client))
			},
		}
	}

	/// Builds a [`VipCheckout`] over the configured provider.
	pub fn checkout<T>(&self, transport: impl Into<Arc<T>>) -> Result<VipCheckout, ConfigError>
	where
		T: ?Sized + HttpTransport,
	{
		Ok(VipCheckout::with_settings(self.charge_client(transport)?, self.vip.clone()))
	}

	#[cfg(feature = "reqwest")]
	/// Builds a [`VipCheckout`] backed by a fresh reqwest client.
	pub fn reqwest_checkout(&self) -> Result<VipCheckout, ConfigError> {
		self.checkout::<ReqwestHttpClient>(ReqwestHttpClient::new()?)
	}
}

/// Payment provider selection.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
	/// PagBank `orders` API with a static bearer token.
	Pagbank {
		/// API root, for example [`charge::PAGBANK_SANDBOX_URL`].
		base_url: Url,
		/// Inline token; takes precedence over `token_env`.
		#[serde(default)]
		token: Option<TokenSecret>,
		/// Environment variable holding the token.
		#[serde(default = "default_token_env")]
		token_env: String,
	},
	/// Standard PIX `cob` API with OAuth client credentials.
	PixCob {
		/// API root; `/v2/cob` is appended.
		base_url: Url,
		/// PIX key receiving the payments.
		pix_key: String,
		/// Charge lifetime in seconds.
		#[serde(default = "default_expiration_secs")]
		expiration_secs: u32,
		/// Token endpoint and client credentials.
		oauth: OAuthConfig,
	},
}

/// Client-credentials settings for a [`TokenCache`].
#[derive(Clone, Debug, Deserialize)]
pub struct OAuthConfig {
	/// Token endpoint.
	pub auth_url: Url,
	/// Client identifier.
	pub client_id: String,
	/// Client secret.
	pub client_secret: TokenSecret,
	/// Seconds subtracted from the reported expiry before refreshing.
	#[serde(default = "default_safety_margin_secs")]
	pub safety_margin_secs: u32,
	/// Upper bound for a token exchange, in seconds.
	#[serde(default = "default_oauth_timeout_secs")]
	pub timeout_secs: u64,
}
impl OAuthConfig {
	/// Validates the credentials and endpoint and converts them into a cache configuration.
	pub fn token_cache_config(&self) -> Result<TokenCacheConfig, ConfigError> {
		let credentials = Credentials::new(&self.client_id, self.client_secret.expose())?;

		Ok(TokenCacheConfig::new(self.auth_url.clone(), credentials)?
			.with_safety_margin(Duration::seconds(self.safety_margin_secs.into()))
			.with_request_timeout(StdDuration::from_secs(self.timeout_secs)))
	}
}

/// Rejects URLs that cannot address an HTTP endpoint.
pub(crate) fn ensure_http_url(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedUrl { field, url: url.to_string() })
	}
}

fn default_request_timeout_secs() -> u64 {
	charge::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_token_env() -> String {
	DEFAULT_TOKEN_ENV.into()
}

fn default_expiration_secs() -> u32 {
	DEFAULT_COB_EXPIRATION_SECS
}

fn default_safety_margin_secs() -> u32 {
	30
}

fn default_oauth_timeout_secs() -> u64 {
	TokenCacheConfig::DEFAULT_REQUEST_TIMEOUT.as_secs()
}
