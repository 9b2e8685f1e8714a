//! PagBank `orders` API client.

// self
use crate::{
	_prelude::*,
	auth::BearerTokenSource,
	charge::{
		self, Charge, ChargeClient, ChargeFuture, ChargeRequest, Customer, PaymentStatus,
		common::{self, ProviderRequest},
	},
	config,
	error::ConfigError,
	obs::FlowKind,
	transport::HttpTransport,
};

/// PagBank sandbox API root.
pub const PAGBANK_SANDBOX_URL: &str = "https://sandbox.api.pagseguro.com";

const PAID: &str = "PAID";

#[derive(Serialize)]
struct OrderPayload<'a> {
	reference_id: &'a str,
	customer: &'a Customer,
	items: [OrderItem<'a>; 1],
	qr_codes: [QrCodeRequest; 1],
}
impl<'a> From<&'a ChargeRequest> for OrderPayload<'a> {
	fn from(request: &'a ChargeRequest) -> Self {
		Self {
			reference_id: &request.reference_id,
			customer: &request.customer,
			items: [OrderItem {
				name: &request.description,
				quantity: 1,
				unit_amount: request.amount_cents,
			}],
			qr_codes: [QrCodeRequest { amount: Amount { value: request.amount_cents } }],
		}
	}
}

#[derive(Serialize)]
struct OrderItem<'a> {
	name: &'a str,
	quantity: u32,
	unit_amount: u64,
}

#[derive(Serialize)]
struct QrCodeRequest {
	amount: Amount,
}

#[derive(Serialize)]
struct Amount {
	value: u64,
}

#[derive(Deserialize)]
struct OrderResponse {
	id: String,
	qr_codes: Option<Vec<QrCode>>,
	payments: Option<Vec<Payment>>,
}
impl OrderResponse {
	fn into_charge(self) -> Charge {
		let from_qr = self.qr_codes.and_then(|codes| codes.into_iter().next()).and_then(|qr| qr.text);
		let pix_code = from_qr
			.filter(|code| !code.is_empty())
			.or_else(|| {
				self.payments
					.and_then(|payments| payments.into_iter().next())
					.and_then(|payment| payment.pix)
					.and_then(|pix| pix.copy_and_paste_code)
			})
			.unwrap_or_default();

		Charge { id: self.id, pix_code }
	}
}

#[derive(Deserialize)]
struct QrCode {
	text: Option<String>,
}

#[derive(Deserialize)]
struct Payment {
	pix: Option<PixPayment>,
}

#[derive(Deserialize)]
struct PixPayment {
	copy_and_paste_code: Option<String>,
}

#[derive(Deserialize)]
struct OrderStatus {
	status: String,
}

/// Creates PIX orders through PagBank and polls them until `PAID`.
pub struct PagBankClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	tokens: Arc<dyn BearerTokenSource>,
	base_url: Url,
	request_timeout: StdDuration,
}
impl<T> PagBankClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client rooted at `base_url` (for example [`PAGBANK_SANDBOX_URL`]).
	pub fn new(
		base_url: Url,
		tokens: Arc<dyn BearerTokenSource>,
		transport: impl Into<Arc<T>>,
	) -> Result<Self, ConfigError> {
		config::ensure_http_url("provider", &base_url)?;

		Ok(Self {
			transport: transport.into(),
			tokens,
			base_url,
			request_timeout: charge::DEFAULT_REQUEST_TIMEOUT,
		})
	}

	/// Overrides the per-call timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Creates an order carrying one item and one PIX QR code for the full amount.
	pub async fn create_order(&self, request: &ChargeRequest) -> Result<Charge> {
		request.validate()?;

		let url = common::endpoint(&self.base_url, &["orders"])?;
		let call = ProviderRequest::post_json(
			FlowKind::CreateCharge,
			url,
			&OrderPayload::from(request),
			self.request_timeout,
		)?;
		let order: OrderResponse =
			common::send_json(self.transport.as_ref(), &*self.tokens, call).await?;

		Ok(order.into_charge())
	}

	/// Fetches the order status; `PAID` means settled.
	pub async fn order_status(&self, id: &str) -> Result<PaymentStatus> {
		charge::ensure_charge_id(id)?;

		let url = common::endpoint(&self.base_url, &["orders", id])?;
		let call = ProviderRequest::get(FlowKind::ChargeStatus, url, self.request_timeout);
		let order: OrderStatus =
			common::send_json(self.transport.as_ref(), &*self.tokens, call).await?;
		let paid = order.status == PAID;

		Ok(PaymentStatus { status: order.status, paid })
	}
}
impl<T> ChargeClient for PagBankClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn create_charge<'a>(&'a self, request: &'a ChargeRequest) -> ChargeFuture<'a, Charge> {
		Box::pin(self.create_order(request))
	}

	fn charge_status<'a>(&'a self, id: &'a str) -> ChargeFuture<'a, PaymentStatus> {
		Box::pin(self.order_status(id))
	}
}
impl<T> Debug for PagBankClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PagBankClient")
			.field("base_url", &self.base_url.as_str())
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}
