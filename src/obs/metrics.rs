// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"pix_gateway_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how long a freshly issued token remains valid, in seconds.
///
/// Lifetimes that shrink toward the safety margin mean the cache refreshes on almost every call.
pub fn record_token_lifetime(lifetime: Duration) {
	let seconds = lifetime.as_seconds_f64().max(0.);

	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("pix_gateway_token_lifetime_seconds").record(seconds);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = seconds;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_a_global_recorder() {
		record_flow_outcome(FlowKind::TokenRefresh, FlowOutcome::CacheHit);
		record_flow_outcome(FlowKind::CreateCharge, FlowOutcome::Failure);
		record_token_lifetime(Duration::seconds(3_600));
		record_token_lifetime(Duration::seconds(-5));
	}
}
