//! Bearer token sources consumed by charge clients.
//!
//! [`BearerTokenSource`] is the seam between charge clients and however a provider hands out
//! tokens: [`crate::cache::TokenCache`] refreshes via the client-credentials grant, while
//! [`StaticToken`] serves a pre-issued token that never expires.

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{AuthError, ConfigError},
};

/// Boxed future returned by [`BearerTokenSource::bearer_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret, AuthError>> + 'a + Send>>;

/// Anything able to produce a bearer token for outbound provider calls.
pub trait BearerTokenSource
where
	Self: Send + Sync,
{
	/// Returns a token that is valid for at least the duration of the next call.
	fn bearer_token(&self) -> TokenFuture<'_>;
}

/// Pre-issued token that is never refreshed.
///
/// The value is sanitized once at construction: surrounding whitespace is trimmed and any
/// embedded CR/LF characters are removed, which is the usual damage done by pasting tokens
/// into environment files.
#[derive(Clone, Debug)]
pub struct StaticToken(TokenSecret);
impl StaticToken {
	/// Sanitizes `raw` and rejects it when nothing usable remains.
	pub fn new(raw: impl AsRef<str>) -> Result<Self, ConfigError> {
		let cleaned = sanitize(raw.as_ref());

		if cleaned.is_empty() {
			return Err(ConfigError::EmptyToken);
		}

		Ok(Self(TokenSecret::new(cleaned)))
	}

	/// Reads and sanitizes the token stored in the environment variable `var`.
	pub fn from_env(var: &str) -> Result<Self, ConfigError> {
		let raw = env::var(var).map_err(|_| ConfigError::MissingEnv { var: var.to_owned() })?;

		Self::new(raw)
	}

	/// Returns the sanitized token.
	pub fn secret(&self) -> &TokenSecret {
		&self.0
	}
}
impl BearerTokenSource for StaticToken {
	fn bearer_token(&self) -> TokenFuture<'_> {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}
}

fn sanitize(raw: &str) -> String {
	raw.trim().chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn static_tokens_are_sanitized_once() {
		let token = StaticToken::new("  abc-123\r\n-def \n").expect("Token should survive cleanup.");

		assert_eq!(token.secret().expose(), "abc-123-def");
	}

	#[test]
	fn blank_static_tokens_are_rejected() {
		assert!(matches!(StaticToken::new(" \r\n "), Err(ConfigError::EmptyToken)));
	}

	#[test]
	fn missing_environment_variable_is_reported() {
		let err = StaticToken::from_env("PIX_GATEWAY_TEST_TOKEN_THAT_IS_NEVER_SET")
			.expect_err("Unset variables should fail.");

		assert!(matches!(err, ConfigError::MissingEnv { .. }));
	}

	#[tokio::test]
	async fn static_source_returns_the_same_token_every_time() {
		let source = StaticToken::new("fixed").expect("Token fixture should be valid.");

		for _ in 0..3 {
			let token = source.bearer_token().await.expect("Static tokens never fail.");

			assert_eq!(token.expose(), "fixed");
		}
	}
}
