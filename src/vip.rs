//! VIP plan checkout built on any [`ChargeClient`].
//!
//! [`VipCheckout`] backs the `POST /vip/purchase` and `GET /vip/confirm/:id` routes of an
//! embedding HTTP service; the request and response types serialize to the JSON shapes those
//! routes exchange (`{ "userId", "plan" }`, `{ "id", "pixCode" }`, `{ "success", "status" }`).

// self
use crate::{
	_prelude::*,
	charge::{ChargeClient, ChargeRequest, Customer},
};

/// Amount and payer used for every VIP charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VipSettings {
	/// Plan price in centavos.
	pub unit_amount_cents: u64,
	/// Payer attached to the charge.
	pub customer: Customer,
}
impl Default for VipSettings {
	fn default() -> Self {
		Self {
			unit_amount_cents: 1_000,
			customer: Customer { name: "Cliente Teste".into(), email: "cliente@test.com".into() },
		}
	}
}

/// Body of a purchase request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
	/// Buyer identifier, embedded in the charge reference.
	#[serde(default)]
	pub user_id: String,
	/// Plan name, embedded in the item description.
	#[serde(default)]
	pub plan: String,
}

/// Charge handed back to the buyer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
	/// Provider charge identifier, used later for confirmation.
	pub id: String,
	/// PIX copy-and-paste code; empty when the provider returned none.
	pub pix_code: String,
}

/// Payment confirmation answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
	/// Whether the charge settled.
	pub success: bool,
	/// Raw provider status.
	pub status: String,
}

/// Sells VIP plans through a configured payment provider.
#[derive(Clone)]
pub struct VipCheckout {
	client: Arc<dyn ChargeClient>,
	settings: VipSettings,
}
impl VipCheckout {
	/// Creates a checkout with the default price and payer.
	pub fn new(client: Arc<dyn ChargeClient>) -> Self {
		Self::with_settings(client, VipSettings::default())
	}

	/// Creates a checkout with explicit settings.
	pub fn with_settings(client: Arc<dyn ChargeClient>, settings: VipSettings) -> Self {
		Self { client, settings }
	}

	/// Returns the active settings.
	pub fn settings(&self) -> &VipSettings {
		&self.settings
	}

	/// Creates a charge for `request.plan` on behalf of `request.user_id`.
	pub async fn purchase(&self, request: &PurchaseRequest) -> Result<PurchaseReceipt> {
		let user_id = request.user_id.trim();
		let plan = request.plan.trim();

		if user_id.is_empty() || plan.is_empty() {
			return Err(Error::invalid_request("userId and plan are required"));
		}

		let charge = ChargeRequest {
			reference_id: format!("vip-{user_id}"),
			description: format!("Plano VIP {plan}"),
			amount_cents: self.settings.unit_amount_cents,
			customer: self.settings.customer.clone(),
		};
		let created = self.client.create_charge(&charge).await?;

		Ok(PurchaseReceipt { id: created.id, pix_code: created.pix_code })
	}

	/// Reports whether the charge `id` has been paid.
	pub async fn confirm(&self, id: &str) -> Result<Confirmation> {
		let id = id.trim();

		if id.is_empty() {
			return Err(Error::invalid_request("charge id is required"));
		}

		let status = self.client.charge_status(id).await?;

		Ok(Confirmation { success: status.paid, status: status.status })
	}
}
impl Debug for VipCheckout {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("VipCheckout").field("settings", &self.settings).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		charge::{Charge, ChargeFuture, PaymentStatus},
		error::{AuthError, ProviderError},
	};

	#[derive(Default)]
	struct RecordingClient {
		seen: Mutex<Vec<ChargeRequest>>,
		fail_auth: bool,
	}
	impl ChargeClient for RecordingClient {
		fn create_charge<'a>(&'a self, request: &'a ChargeRequest) -> ChargeFuture<'a, Charge> {
			self.seen.lock().push(request.clone());

			let result: Result<Charge> = if self.fail_auth {
				Err(AuthError::unexpected_status(401, b"invalid_client").into())
			} else {
				Ok(Charge { id: "ORDE_1".into(), pix_code: "000201".into() })
			};

			Box::pin(async move { result })
		}

		fn charge_status<'a>(&'a self, id: &'a str) -> ChargeFuture<'a, PaymentStatus> {
			let result: Result<PaymentStatus> = match id {
				"paid" => Ok(PaymentStatus { status: "PAID".into(), paid: true }),
				"waiting" => Ok(PaymentStatus { status: "WAITING".into(), paid: false }),
				_ => Err(ProviderError::Rejected { operation: "charge_status", status: 404, body: None }
					.into()),
			};

			Box::pin(async move { result })
		}
	}

	#[tokio::test]
	async fn purchase_builds_the_vip_charge() {
		let client = Arc::new(RecordingClient::default());
		let checkout = VipCheckout::new(client.clone());
		let receipt = checkout
			.purchase(&PurchaseRequest { user_id: "42".into(), plan: "gold".into() })
			.await
			.expect("Purchase should succeed.");

		assert_eq!(receipt, PurchaseReceipt { id: "ORDE_1".into(), pix_code: "000201".into() });
		assert_eq!(
			serde_json::to_value(&receipt).expect("Receipt should serialize."),
			json!({ "id": "ORDE_1", "pixCode": "000201" })
		);

		let seen = client.seen.lock();

		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].reference_id, "vip-42");
		assert_eq!(seen[0].description, "Plano VIP gold");
		assert_eq!(seen[0].amount_cents, 1_000);
		assert_eq!(seen[0].customer.email, "cliente@test.com");
	}

	#[tokio::test]
	async fn purchase_requires_user_and_plan() {
		let client = Arc::new(RecordingClient::default());
		let checkout = VipCheckout::new(client.clone());
		let request: PurchaseRequest =
			serde_json::from_value(json!({ "userId": "42" })).expect("Partial bodies should parse.");
		let err = checkout.purchase(&request).await.expect_err("Missing plan should fail.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
		assert!(client.seen.lock().is_empty());
	}

	#[tokio::test]
	async fn auth_failures_stay_distinguishable() {
		let client = Arc::new(RecordingClient { fail_auth: true, ..Default::default() });
		let checkout = VipCheckout::new(client);
		let err = checkout
			.purchase(&PurchaseRequest { user_id: "42".into(), plan: "gold".into() })
			.await
			.expect_err("Auth failures should surface.");

		assert!(matches!(err, Error::Auth(AuthError { status: Some(401), .. })));
	}

	#[tokio::test]
	async fn confirm_maps_paid_flag() {
		let checkout = VipCheckout::new(Arc::new(RecordingClient::default()));
		let paid = checkout.confirm("paid").await.expect("Lookup should succeed.");
		let waiting = checkout.confirm("waiting").await.expect("Lookup should succeed.");

		assert_eq!(paid, Confirmation { success: true, status: "PAID".into() });
		assert_eq!(
			serde_json::to_value(&waiting).expect("Confirmation should serialize."),
			json!({ "success": false, "status": "WAITING" })
		);
		assert!(matches!(checkout.confirm(" ").await, Err(Error::InvalidRequest { .. })));
		assert!(matches!(
			checkout.confirm("missing").await,
			Err(Error::Provider(ProviderError::Rejected { status: 404, .. }))
		));
	}
}
