//! Optional observability helpers for token refreshes and provider calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pix_gateway.flow` with the `flow` and
//!   `stage` (call site) fields, plus a `warn` event whenever a flow fails.
//! - Enable `metrics` to increment the `pix_gateway_flow_total` counter for every outcome,
//!   labeled by `flow` + `outcome`, and to record the lifetime of every issued token in the
//!   `pix_gateway_token_lifetime_seconds` histogram.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Bearer token lookup and client-credentials refresh.
	TokenRefresh,
	/// Charge creation against a payment provider.
	CreateCharge,
	/// Charge status lookup against a payment provider.
	ChargeStatus,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::TokenRefresh => "token_refresh",
			FlowKind::CreateCharge => "create_charge",
			FlowKind::ChargeStatus => "charge_status",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// A network call is about to be made.
	Attempt,
	/// Served from a still-fresh cached token.
	CacheHit,
	/// Served from a refresh performed by a concurrent caller.
	Shared,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::CacheHit => "cache_hit",
			FlowOutcome::Shared => "shared",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
