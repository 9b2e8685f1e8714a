//! Client for the standard PIX `cob` (immediate charge) API.
//!
//! Providers exposing this API authenticate with OAuth client credentials, so the client is
//! normally paired with a [`TokenCache`](crate::cache::TokenCache) as its token source.

// self
use crate::{
	_prelude::*,
	auth::BearerTokenSource,
	charge::{
		self, Charge, ChargeClient, ChargeFuture, ChargeRequest, PaymentStatus,
		common::{self, ProviderRequest},
	},
	config,
	error::ConfigError,
	obs::FlowKind,
	transport::HttpTransport,
};

/// Default charge lifetime in seconds.
pub const DEFAULT_COB_EXPIRATION_SECS: u32 = 3_600;

const SETTLED: &str = "CONCLUIDA";
const PAYER_MESSAGE_LIMIT: usize = 140;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CobPayload<'a> {
	calendario: Calendario,
	valor: Valor,
	chave: &'a str,
	solicitacao_pagador: String,
	info_adicionais: [InfoAdicional<'a>; 1],
}

#[derive(Serialize)]
struct Calendario {
	expiracao: u32,
}

#[derive(Serialize)]
struct Valor {
	original: String,
}

#[derive(Serialize)]
struct InfoAdicional<'a> {
	nome: &'static str,
	valor: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CobResponse {
	txid: String,
	pix_copia_e_cola: Option<String>,
}

#[derive(Deserialize)]
struct CobStatus {
	status: String,
}

/// Creates immediate PIX charges (`cob`) and polls them until `CONCLUIDA`.
pub struct PixCobClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	tokens: Arc<dyn BearerTokenSource>,
	base_url: Url,
	pix_key: String,
	expiration_secs: u32,
	request_timeout: StdDuration,
}
impl<T> PixCobClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client rooted at `base_url` that receives payments on `pix_key`.
	pub fn new(
		base_url: Url,
		pix_key: impl Into<String>,
		tokens: Arc<dyn BearerTokenSource>,
		transport: impl Into<Arc<T>>,
	) -> Result<Self, ConfigError> {
		config::ensure_http_url("provider", &base_url)?;

		let pix_key = pix_key.into().trim().to_owned();

		if pix_key.is_empty() {
			return Err(ConfigError::MissingPixKey);
		}

		Ok(Self {
			transport: transport.into(),
			tokens,
			base_url,
			pix_key,
			expiration_secs: DEFAULT_COB_EXPIRATION_SECS,
			request_timeout: charge::DEFAULT_REQUEST_TIMEOUT,
		})
	}

	/// Overrides how long created charges stay payable.
	pub fn with_expiration_secs(mut self, secs: u32) -> Self {
		self.expiration_secs = secs;

		self
	}

	/// Overrides the per-call timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Creates a `cob` for the request amount; the provider assigns the `txid`.
	pub async fn create_cob(&self, request: &ChargeRequest) -> Result<Charge> {
		request.validate()?;

		let url = common::endpoint(&self.base_url, &["v2", "cob"])?;
		let payload = CobPayload {
			calendario: Calendario { expiracao: self.expiration_secs },
			valor: Valor { original: format_brl(request.amount_cents) },
			chave: &self.pix_key,
			solicitacao_pagador: request.description.chars().take(PAYER_MESSAGE_LIMIT).collect(),
			info_adicionais: [InfoAdicional { nome: "referencia", valor: &request.reference_id }],
		};
		let call =
			ProviderRequest::post_json(FlowKind::CreateCharge, url, &payload, self.request_timeout)?;
		let cob: CobResponse = common::send_json(self.transport.as_ref(), &*self.tokens, call).await?;

		Ok(Charge { id: cob.txid, pix_code: cob.pix_copia_e_cola.unwrap_or_default() })
	}

	/// Fetches the `cob` status; `CONCLUIDA` means settled.
	pub async fn cob_status(&self, txid: &str) -> Result<PaymentStatus> {
		charge::ensure_charge_id(txid)?;

		let url = common::endpoint(&self.base_url, &["v2", "cob", txid])?;
		let call = ProviderRequest::get(FlowKind::ChargeStatus, url, self.request_timeout);
		let cob: CobStatus = common::send_json(self.transport.as_ref(), &*self.tokens, call).await?;
		let paid = cob.status == SETTLED;

		Ok(PaymentStatus { status: cob.status, paid })
	}
}
impl<T> ChargeClient for PixCobClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn create_charge<'a>(&'a self, request: &'a ChargeRequest) -> ChargeFuture<'a, Charge> {
		Box::pin(self.create_cob(request))
	}

	fn charge_status<'a>(&'a self, id: &'a str) -> ChargeFuture<'a, PaymentStatus> {
		Box::pin(self.cob_status(id))
	}
}
impl<T> Debug for PixCobClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PixCobClient")
			.field("base_url", &self.base_url.as_str())
			.field("expiration_secs", &self.expiration_secs)
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

/// Renders centavos as the decimal string the `cob` API expects (`1000` → `"10.00"`).
fn format_brl(cents: u64) -> String {
	format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::StaticToken;

	struct NoTransport;
	impl HttpTransport for NoTransport {
		type TransportError = std::io::Error;

		fn send(
			&self,
			_request: crate::transport::HttpRequest,
		) -> crate::transport::TransportFuture<'_, Self::TransportError> {
			Box::pin(async { Err(std::io::Error::other("offline")) })
		}
	}

	fn tokens() -> Arc<dyn BearerTokenSource> {
		Arc::new(StaticToken::new("token").expect("Token fixture should be valid."))
	}

	#[test]
	fn amounts_render_with_two_decimals() {
		assert_eq!(format_brl(1_000), "10.00");
		assert_eq!(format_brl(5), "0.05");
		assert_eq!(format_brl(123_456), "1234.56");
	}

	#[test]
	fn blank_pix_keys_are_rejected() {
		let base = Url::parse("https://pix.example.com").expect("URL should parse.");
		let err = PixCobClient::<NoTransport>::new(base, "  ", tokens(), NoTransport)
			.expect_err("Blank keys should be rejected.");

		assert!(matches!(err, ConfigError::MissingPixKey));
	}

	#[tokio::test]
	async fn transport_failures_are_provider_errors() {
		let base = Url::parse("https://pix.example.com").expect("URL should parse.");
		let client = PixCobClient::<NoTransport>::new(base, "key@example.com", tokens(), NoTransport)
			.expect("Client should build.");
		let err = client.cob_status("tx1").await.expect_err("Offline transport should fail.");

		assert!(matches!(
			err,
			Error::Provider(crate::error::ProviderError::Transport { operation: "charge_status", .. })
		));
	}
}
