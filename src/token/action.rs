//! Signed action names and the protocol generations that select them.

// self
use crate::_prelude::*;

/// Protocol generation spoken with the remote platform.
///
/// Tokens minted under one generation never verify under the other because
/// the action name is part of the HMAC message. Both generations stay
/// available so deployments can migrate without a flag day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
	/// Original id-keyed payloads.
	Legacy,
	#[default]
	/// Current username-keyed payloads.
	V3,
}

/// Signed operations exchanged with the remote platform.
///
/// The action name prefixes every HMAC message, so a token minted for one
/// operation can never authorize another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
	/// Visitor hand-off to the platform with proof of identity.
	Auth,
	/// Embedded event view for an already-authenticated user.
	Join,
	/// Inbound participation/grade report callback.
	Report,
	/// Outbound event creation.
	Create,
	/// Outbound credential health check.
	Ping,
	/// Outbound listing of the user's existing events.
	EventsList,
	/// Inbound activity rename pushed by the platform.
	RenameInbound,
	/// Outbound rename propagated to the platform.
	RenameOutbound,
	/// First step of the id→username migration.
	UpgradeStep1,
	/// Second step of the id→username migration.
	UpgradeStep2,
}
impl Action {
	/// Returns the wire action name for the given protocol generation.
	pub const fn wire_name(self, version: ProtocolVersion) -> &'static str {
		use ProtocolVersion::*;

		match (self, version) {
			(Action::Auth, Legacy) => "AUTH",
			(Action::Auth, V3) => "AUTHv3",
			(Action::Join, Legacy) => "JOIN",
			(Action::Join, V3) => "JOINv3",
			(Action::Report, Legacy) => "REPORT",
			(Action::Report, V3) => "REPORTv3",
			(Action::EventsList, Legacy) => "EVENTS_LIST",
			(Action::EventsList, V3) => "EVENTS_LIST_V3",
			// Generation-independent operations.
			(Action::Create, _) => "CREATE",
			(Action::Ping, _) => "PING",
			(Action::RenameInbound, _) | (Action::RenameOutbound, _) => "RENAME",
			(Action::UpgradeStep1, _) => "V3_UPGRADE_STEP_1",
			(Action::UpgradeStep2, _) => "V3_UPGRADE_STEP_2",
		}
	}
}
impl Display for Action {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.wire_name(ProtocolVersion::default()))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn wire_names_differ_per_generation() {
		assert_eq!(Action::Auth.wire_name(ProtocolVersion::Legacy), "AUTH");
		assert_eq!(Action::Auth.wire_name(ProtocolVersion::V3), "AUTHv3");
		assert_eq!(Action::Report.wire_name(ProtocolVersion::V3), "REPORTv3");
		assert_eq!(Action::EventsList.wire_name(ProtocolVersion::V3), "EVENTS_LIST_V3");
	}

	#[test]
	fn shared_operations_keep_one_name() {
		for version in [ProtocolVersion::Legacy, ProtocolVersion::V3] {
			assert_eq!(Action::Create.wire_name(version), "CREATE");
			assert_eq!(Action::Ping.wire_name(version), "PING");
			assert_eq!(Action::RenameInbound.wire_name(version), "RENAME");
		}
	}
}
