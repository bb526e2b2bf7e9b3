// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by gateway flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	stage: &'static str,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("starmf_gateway.flow", flow = kind.as_str(), stage);

			Self { kind, stage, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			Self { kind, stage }
		}
	}

	/// Flow kind recorded on the span.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Call-site label recorded on the span.
	pub fn stage(&self) -> &'static str {
		self.stage
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Emits a warning event for a failed flow inside the span.
	pub fn record_failure(&self, error: &dyn Display) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| {
				tracing::warn!(
					flow = self.kind.as_str(),
					stage = self.stage,
					error = %error,
					"flow failed"
				);
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = error;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flow_span_keeps_labels() {
		let span = FlowSpan::new(FlowKind::UccAllocation, "allocate_ucc");

		assert_eq!(span.kind(), FlowKind::UccAllocation);
		assert_eq!(span.stage(), "allocate_ucc");

		span.record_failure(&"store unavailable");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Login, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
