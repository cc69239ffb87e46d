//! Optional observability helpers for bridge flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `quiz_bridge.flow` with the `flow`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `quiz_bridge_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge flow kinds observed across inbound and outbound operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Visitor authentication hand-off.
	Auth,
	/// Consent capture.
	Consent,
	/// Event view embedding.
	Join,
	/// Inbound participation report.
	Report,
	/// Activity rename (either direction).
	Rename,
	/// Outbound event creation.
	Create,
	/// Credential health check.
	Ping,
	/// Event listing.
	EventsList,
	/// Protocol generation migration.
	Upgrade,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Auth => "auth",
			FlowKind::Consent => "consent",
			FlowKind::Join => "join",
			FlowKind::Report => "report",
			FlowKind::Rename => "rename",
			FlowKind::Create => "create",
			FlowKind::Ping => "ping",
			FlowKind::EventsList => "events_list",
			FlowKind::Upgrade => "upgrade",
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
	/// Entry to a bridge flow.
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
