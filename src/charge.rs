//! Payment provider clients that create PIX charges and poll their status.
//!
//! Every client authenticates through a [`BearerTokenSource`](crate::auth::BearerTokenSource)
//! and reports token failures as [`Error::Auth`], keeping them apart from the provider's own
//! refusals ([`Error::Provider`]).

pub mod cob;
pub mod pagbank;

mod common;

pub use cob::*;
pub use pagbank::*;

// self
use crate::_prelude::*;

/// Default upper bound for a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Boxed future returned by [`ChargeClient`] operations.
pub type ChargeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Provider-agnostic charge operations.
pub trait ChargeClient
where
	Self: Send + Sync,
{
	/// Creates a PIX charge and returns its provider identifier and copy-and-paste code.
	fn create_charge<'a>(&'a self, request: &'a ChargeRequest) -> ChargeFuture<'a, Charge>;

	/// Looks up the current status of the charge identified by `id`.
	fn charge_status<'a>(&'a self, id: &'a str) -> ChargeFuture<'a, PaymentStatus>;
}

/// Payer shown on the charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
	/// Display name.
	pub name: String,
	/// Contact email.
	pub email: String,
}

/// Input for [`ChargeClient::create_charge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChargeRequest {
	/// Merchant-side reference attached to the charge.
	pub reference_id: String,
	/// Item name or payer-facing description.
	pub description: String,
	/// Amount in centavos.
	pub amount_cents: u64,
	/// Payer details.
	pub customer: Customer,
}
impl ChargeRequest {
	/// Rejects requests that no provider would accept.
	pub fn validate(&self) -> Result<()> {
		if self.reference_id.trim().is_empty() {
			return Err(Error::invalid_request("reference id cannot be empty"));
		}
		if self.description.trim().is_empty() {
			return Err(Error::invalid_request("description cannot be empty"));
		}
		if self.amount_cents == 0 {
			return Err(Error::invalid_request("amount must be positive"));
		}

		Ok(())
	}
}

/// Charge created by a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
	/// Provider identifier used for status lookups.
	pub id: String,
	/// PIX copy-and-paste code; empty when the provider did not return one.
	pub pix_code: String,
}

/// Charge status as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
	/// Raw provider status (for example `WAITING`, `PAID`, `ATIVA`, `CONCLUIDA`).
	pub status: String,
	/// Whether the status means the payment settled.
	pub paid: bool,
}

pub(crate) fn ensure_charge_id(id: &str) -> Result<()> {
	if id.trim().is_empty() { Err(Error::invalid_request("charge id cannot be empty")) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> ChargeRequest {
		ChargeRequest {
			reference_id: "vip-42".into(),
			description: "Plano VIP gold".into(),
			amount_cents: 1_000,
			customer: Customer { name: "Cliente Teste".into(), email: "cliente@test.com".into() },
		}
	}

	#[test]
	fn valid_requests_pass() {
		request().validate().expect("Fixture should be valid.");
	}

	#[test]
	fn blank_fields_and_zero_amounts_are_rejected() {
		let mut blank_reference = request();

		blank_reference.reference_id = "  ".into();

		let mut zero = request();

		zero.amount_cents = 0;

		for invalid in [blank_reference, zero] {
			assert!(matches!(invalid.validate(), Err(Error::InvalidRequest { .. })));
		}
		assert!(matches!(ensure_charge_id(""), Err(Error::InvalidRequest { .. })));
	}
}
