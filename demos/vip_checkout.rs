//! Demonstrates a config-driven VIP checkout against a mock PIX `cob` provider that issues
//! OAuth client-credentials tokens.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use pix_gateway::{
	config::GatewayConfig,
	reqwest::{Client, redirect::Policy},
	transport::ReqwestHttpClient,
	vip::PurchaseRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).json_body(json!({ "access_token": "demo-access", "expires_in": 3600 }));
		})
		.await;
	let _cob_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/cob");
			then.status(201).json_body(json!({
				"txid": "demo-txid",
				"status": "ATIVA",
				"pixCopiaECola": "00020101021226880014br.gov.bcb.pix",
			}));
		})
		.await;
	let _status_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/cob/demo-txid");
			then.status(200).json_body(json!({ "txid": "demo-txid", "status": "CONCLUIDA" }));
		})
		.await;
	let config = GatewayConfig::from_json_str(
		&json!({
			"provider": {
				"kind": "pix_cob",
				"base_url": server.base_url(),
				"pix_key": "payments@example.com",
				"oauth": {
					"auth_url": server.url("/oauth/token"),
					"client_id": "demo-client",
					"client_secret": "super-secret",
				},
			},
		})
		.to_string(),
	)?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let checkout = config.checkout::<ReqwestHttpClient>(http_client)?;
	let receipt = checkout
		.purchase(&PurchaseRequest { user_id: "user-7".into(), plan: "mensal".into() })
		.await?;

	println!("Purchase response: {}.", serde_json::to_string(&receipt)?);

	let confirmation = checkout.confirm(&receipt.id).await?;

	println!("Confirmation response: {}.", serde_json::to_string(&confirmation)?);

	token_mock.assert_async().await;

	Ok(())
}
