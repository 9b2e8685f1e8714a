//! Token cache configuration.

// self
use crate::{_prelude::*, auth::Credentials, config, error::ConfigError};

/// Authorization endpoint, credentials, and timing knobs for a [`TokenCache`](super::TokenCache).
#[derive(Clone, Debug)]
pub struct TokenCacheConfig {
	/// Token endpoint receiving the client-credentials exchange.
	pub auth_url: Url,
	/// Client identifier + secret sent as HTTP Basic credentials.
	pub credentials: Credentials,
	/// Margin subtracted from the reported expiry before a token is considered stale.
	pub safety_margin: Duration,
	/// Upper bound for a single token exchange.
	pub request_timeout: StdDuration,
}
impl TokenCacheConfig {
	/// Default safety margin (30 seconds).
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(30);
	/// Default exchange timeout (10 seconds).
	pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Creates a configuration with the default margin and timeout.
	pub fn new(auth_url: Url, credentials: Credentials) -> Result<Self, ConfigError> {
		config::ensure_http_url("auth", &auth_url)?;

		Ok(Self {
			auth_url,
			credentials,
			safety_margin: Self::DEFAULT_SAFETY_MARGIN,
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		})
	}

	/// Overrides the safety margin; negative values are clamped to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Overrides the exchange timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}
}
