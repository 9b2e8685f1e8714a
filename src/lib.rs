//! Single-flight OAuth 2.0 client-credentials token cache, plus the PIX charge clients and VIP
//! checkout service that consume it.
//!
//! [`cache::TokenCache`] is the core: it hands out a bearer token, refreshes it once it crosses
//! its safety margin, and collapses concurrent refreshes into one token-endpoint call.
//! [`charge`] implements provider clients on top of any [`auth::BearerTokenSource`], and
//! [`config`] selects one of them from a JSON document.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod charge;
pub mod config;
pub mod error;
pub mod obs;
pub mod transport;
pub mod vip;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		cache::{ReqwestTokenCache, TokenCacheConfig},
		transport::ReqwestHttpClient,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests. Redirects stay disabled like [`ReqwestHttpClient::new`].
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ReqwestTokenCache`] backed by [`test_reqwest_http_client`].
	pub fn build_reqwest_test_cache(config: TokenCacheConfig) -> ReqwestTokenCache {
		ReqwestTokenCache::with_transport(config, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
