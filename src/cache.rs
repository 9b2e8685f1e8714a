//! Bearer token cache with expiry-based, single-flight client-credentials refresh.
//!
//! [`TokenCache::get_token`] answers from the cached token while `now` is strictly before
//! `expires_at - safety_margin`. Otherwise the caller takes the refresh gate and performs one
//! exchange. Callers that queued on the gate while that exchange was in flight receive its
//! outcome (token or error) without issuing their own request; callers that arrive after it
//! finished see either a fresh token or, after a failure, start a new exchange. Failures never
//! reach the cached slot.

pub mod clock;
pub mod config;
pub mod metrics;

mod exchange;

pub use clock::*;
pub use config::*;
pub use metrics::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{BearerTokenSource, TokenFuture, TokenSecret},
	error::AuthError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::HttpTransport,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, transport::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Token cache specialized for the crate's default reqwest transport.
pub type ReqwestTokenCache = TokenCache<ReqwestHttpClient>;

type RefreshOutcome = Result<CachedToken, AuthError>;

/// Token value plus the absolute instant the authorization server said it expires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer token value.
	pub value: TokenSecret,
	/// Issuance instant plus the reported `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Returns `true` while `now` is strictly before `expires_at - margin`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		self.expires_at.checked_sub(margin).is_some_and(|stale_at| now < stale_at)
	}
}

#[derive(Default)]
struct RefreshGate {
	generation: u64,
	last: Option<RefreshOutcome>,
}
impl RefreshGate {
	/// Outcome of the exchange that finished after `observed`, if any.
	fn completed_since(&self, observed: u64) -> Option<RefreshOutcome> {
		if self.generation == observed { None } else { self.last.clone() }
	}
}

/// Caches one bearer token per authorization endpoint + credentials pair.
///
/// Construct one instance per provider configuration and share it (`Arc<TokenCache<_>>` or via
/// [`BearerTokenSource`]) with every caller that needs the token.
pub struct TokenCache<T>
where
	T: ?Sized + HttpTransport,
{
	config: TokenCacheConfig,
	transport: Arc<T>,
	clock: Arc<dyn Clock>,
	current: RwLock<Option<CachedToken>>,
	gate: AsyncMutex<RefreshGate>,
	// Mirrors `RefreshGate::generation` so callers can note it before queueing on the gate.
	completed: AtomicU64,
	metrics: Arc<TokenCacheMetrics>,
}
impl<T> TokenCache<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an empty cache that exchanges tokens through `transport`.
	pub fn with_transport(config: TokenCacheConfig, transport: impl Into<Arc<T>>) -> Self {
		Self {
			config,
			transport: transport.into(),
			clock: Arc::new(SystemClock),
			current: RwLock::new(None),
			gate: AsyncMutex::new(RefreshGate::default()),
			completed: AtomicU64::new(0),
			metrics: Default::default(),
		}
	}

	/// Replaces the time source used for expiry decisions.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Returns the configuration this cache was built with.
	pub fn config(&self) -> &TokenCacheConfig {
		&self.config
	}

	/// Returns the counters recorded by this cache.
	pub fn metrics(&self) -> &TokenCacheMetrics {
		&self.metrics
	}

	/// Returns a snapshot of the cached token, fresh or not.
	pub fn cached(&self) -> Option<CachedToken> {
		self.current.read().clone()
	}

	/// Returns a token that stays valid for at least the safety margin, refreshing it via the
	/// client-credentials grant when absent or stale.
	///
	/// At most one exchange is in flight per cache. The call never retries; a failed exchange
	/// is returned to every caller that waited on it and is not cached. Dropping the refreshing
	/// caller's future releases the gate without recording an outcome, so the next queued
	/// caller performs its own exchange. The exchange is bounded by the transport honoring
	/// [`RequestTimeout`](crate::transport::RequestTimeout).
	pub async fn get_token(&self) -> Result<TokenSecret, AuthError> {
		if let Some(token) = self.fresh_at(self.clock.now()) {
			self.record_hit();

			return Ok(token);
		}

		let observed = self.completed.load(Ordering::Acquire);
		let span = FlowSpan::new(FlowKind::TokenRefresh, "get_token");

		span.instrument(self.refresh_or_join(observed)).await
	}

	async fn refresh_or_join(&self, observed: u64) -> Result<TokenSecret, AuthError> {
		const KIND: FlowKind = FlowKind::TokenRefresh;

		let mut gate = self.gate.lock().await;

		if let Some(outcome) = gate.completed_since(observed) {
			self.metrics.record_shared();
			obs::record_flow_outcome(KIND, FlowOutcome::Shared);

			return outcome.map(|token| token.value);
		}

		let now = self.clock.now();

		// Covers a refresh that landed between the fast-path read and the generation load.
		if let Some(token) = self.fresh_at(now) {
			self.record_hit();

			return Ok(token);
		}

		self.metrics.record_refresh();
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let outcome = exchange::client_credentials(&self.config, self.transport.as_ref(), now).await;

		match &outcome {
			Ok(token) => {
				*self.current.write() = Some(token.clone());

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				obs::record_token_lifetime(token.expires_at - now);
			},
			Err(err) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, err);
			},
		}

		gate.generation = gate.generation.wrapping_add(1);
		gate.last = Some(outcome.clone());
		self.completed.store(gate.generation, Ordering::Release);

		outcome.map(|token| token.value)
	}

	fn fresh_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.current
			.read()
			.as_ref()
			.filter(|token| token.is_fresh_at(now, self.config.safety_margin))
			.map(|token| token.value.clone())
	}

	fn record_hit(&self) {
		self.metrics.record_hit();
		obs::record_flow_outcome(FlowKind::TokenRefresh, FlowOutcome::CacheHit);
	}
}
#[cfg(feature = "reqwest")]
impl TokenCache<ReqwestHttpClient> {
	/// Creates a cache backed by a fresh reqwest client that never follows redirects.
	pub fn new(config: TokenCacheConfig) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(config, ReqwestHttpClient::new()?))
	}
}
impl<T> BearerTokenSource for TokenCache<T>
where
	T: ?Sized + HttpTransport,
{
	fn bearer_token(&self) -> TokenFuture<'_> {
		Box::pin(self.get_token())
	}
}
impl<T> Debug for TokenCache<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("auth_url", &self.config.auth_url.as_str())
			.field("client_id", &self.config.credentials.client_id())
			.field("expires_at", &self.current.read().as_ref().map(|token| token.expires_at))
			.finish()
	}
}
