//! Optional observability helpers for gateway flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `starmf_gateway.flow` with the `flow`
//!   and `stage` (call site) fields.
//! - Enable `metrics` to increment the `starmf_gateway_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Runs `fut` inside a [`FlowSpan`], recording the attempt and its outcome.
///
/// Failures are also emitted as a `warn` event on the span when `tracing` is enabled.
pub async fn observe<T, E, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T, E>
where
	E: Display,
	Fut: Future<Output = Result<T, E>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(err) => {
			span.record_failure(err);
			record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}

	result
}

/// Flow kinds observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Platform login (token refresh).
	Login,
	/// Encrypted or plain JSON POST to a platform endpoint.
	SecurePost,
	/// Client code allocation against the sequence store.
	UccAllocation,
	/// Client registration (allocation followed by the add-UCC call).
	ClientRegistration,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::SecurePost => "secure_post",
			FlowKind::UccAllocation => "ucc_allocation",
			FlowKind::ClientRegistration => "client_registration",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gateway flow.
	Attempt,
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
