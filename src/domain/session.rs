//! Visitor session state threaded through the multi-redirect auth flow.

// self
use crate::_prelude::*;
use crate::domain::{CmId, CourseId, UserId, Username};

/// Learner's decision about sharing their email with the remote platform.
///
/// Durable for the session lifetime once resolved; teachers and
/// consent-screen-off deployments resolve to [`ConsentState::Agreed`]
/// implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
	#[default]
	/// No decision recorded yet.
	Unset,
	/// Email sharing granted.
	Agreed,
	/// Email sharing refused.
	Declined,
}
impl ConsentState {
	/// Whether a decision has been recorded.
	pub const fn is_resolved(self) -> bool {
		!matches!(self, Self::Unset)
	}

	/// Whether email sharing was explicitly granted.
	pub const fn granted(self) -> bool {
		matches!(self, Self::Agreed)
	}
}
impl From<bool> for ConsentState {
	fn from(agreed: bool) -> Self {
		if agreed { Self::Agreed } else { Self::Declined }
	}
}

/// Captured intent of a visitor who hit the auth entry point.
///
/// Held in the session store until the signed redirect consumes it; an
/// abandoned request simply ages out with the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingAuthRequest {
	/// Course the visitor is entering from.
	pub course: CourseId,
	/// Course-module of the target activity.
	pub cm: CmId,
	/// Validated callback the signed payload will be appended to.
	pub callback: Url,
	/// Consent snapshot taken while the flow was in progress.
	pub consent: ConsentState,
}
impl PendingAuthRequest {
	/// Captures a visitor's intent with consent still unresolved.
	pub fn new(course: CourseId, cm: CmId, callback: Url) -> Self {
		Self { course, cm, callback, consent: ConsentState::Unset }
	}
}

/// Course-level role derived per request, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Holds the course-update capability.
	Teacher,
	/// Everyone else.
	Student,
}
impl Role {
	/// Wire label for the `role` field.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Teacher => "teacher",
			Self::Student => "student",
		}
	}

	/// Derives the role from the course-update capability.
	pub fn from_capability(can_update_course: bool) -> Self {
		if can_update_course { Self::Teacher } else { Self::Student }
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Host user profile consumed by the signed payload builders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	/// Host user identifier.
	pub id: UserId,
	/// Login name carried on the wire.
	pub username: Username,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Email address, shared only with consent.
	pub email: String,
}
impl UserRecord {
	/// `first last` display form used by the remote platform.
	pub fn display_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}

	/// Email value for the wire: blank unless consent was granted.
	pub fn consented_email(&self, consent: ConsentState) -> &str {
		if consent.granted() { &self.email } else { "" }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn user() -> UserRecord {
		UserRecord {
			id: UserId::from(7),
			username: Username::new("ada").expect("Username fixture should be valid."),
			first_name: "Ada".into(),
			last_name: "Lovelace".into(),
			email: "ada@example.edu".into(),
		}
	}

	#[test]
	fn consent_gates_the_email() {
		let user = user();

		assert_eq!(user.consented_email(ConsentState::Agreed), "ada@example.edu");
		assert_eq!(user.consented_email(ConsentState::Declined), "");
		assert_eq!(user.consented_email(ConsentState::Unset), "");
	}

	#[test]
	fn role_tracks_the_capability() {
		assert_eq!(Role::from_capability(true), Role::Teacher);
		assert_eq!(Role::from_capability(false), Role::Student);
		assert_eq!(Role::Teacher.as_str(), "teacher");
	}

	#[test]
	fn pending_request_starts_unresolved() {
		let pending = PendingAuthRequest::new(
			CourseId::from(5),
			CmId::from(9),
			Url::parse("https://svc.example/cb").expect("Callback fixture should parse."),
		);

		assert_eq!(pending.consent, ConsentState::Unset);
	}
}
