//! Demonstrates the token cache against a mock authorization server: the first call performs
//! the client-credentials exchange, concurrent and later calls reuse the cached token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use pix_gateway::{
	auth::Credentials,
	cache::{ReqwestTokenCache, TokenCacheConfig},
	reqwest::{Client, redirect::Policy},
	transport::ReqwestHttpClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").body("grant_type=client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":900}");
		})
		.await;
	let config = TokenCacheConfig::new(
		Url::parse(&server.url("/oauth/token"))?,
		Credentials::new("demo-client", "super-secret")?,
	)?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let cache = Arc::new(ReqwestTokenCache::with_transport(config, http_client));
	let tasks = (0..4)
		.map(|_| {
			let cache = cache.clone();

			tokio::spawn(async move { cache.get_token().await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let token = task.await??;

		println!("Bearer token: {}.", token.expose());
	}

	let metrics = cache.metrics();

	println!(
		"Exchanges: {}, cache hits: {}, shared results: {}.",
		metrics.refreshes(),
		metrics.hits(),
		metrics.shared()
	);

	token_mock.assert_async().await;

	Ok(())
}
